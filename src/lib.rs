//! Condo Arrears - common-expense (Gastos Comunes) late-fee engine
//!
//! This library provides:
//! - Late-fee derivation per unit and billing period (months overdue, TIMC
//!   interest, quarter-fee penalty, balance and status)
//! - Fee schedule and interest-rate tables loaded from sheet exports
//! - Per-unit statements with virtual entries for unpaid periods
//! - Parallel batch evaluation of payment records
//! - Plain-text receipt and reminder emails

pub mod error;
pub mod payments;
pub mod schedule;
pub mod arrears;
pub mod runner;
pub mod notice;

// Re-export commonly used types
pub use error::{ArrearsError, Result};
pub use payments::{PaymentMethod, PaymentRecord, Period};
pub use schedule::{BillingRules, BillingSnapshot, FeeSchedule, InterestRateTable};
pub use arrears::{ArrearsCalculator, LedgerEntry, LedgerStatus, LedgerSummary, UnitStatement};
pub use runner::LedgerRunner;
