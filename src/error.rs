//! Error type shared by the calculator and the CSV loaders

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrearsError {
    /// A calculator precondition was violated (negative fee, bad month, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field in an input file could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// A payment or statement refers to a unit missing from the fee schedule
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}

pub type Result<T> = std::result::Result<T, ArrearsError>;

impl ArrearsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ArrearsError::InvalidInput(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ArrearsError::Parse(msg.into())
    }
}
