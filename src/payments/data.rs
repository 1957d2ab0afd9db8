//! Billing periods and payment records as exported from the administration sheet

use crate::error::{ArrearsError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spanish month names used in period labels ("Marzo 2024")
pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A (year, month) billing cycle
///
/// Always holds a month in 1..=12; serialized as its label ("Marzo 2024").
/// Use [`Period::from_month_index`] when starting from a 0-based month index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ArrearsError::invalid(format!(
                "month {} out of range 1..=12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Build from a 0-based month index (0 = January)
    pub fn from_month_index(year: i32, month_index: u32) -> Result<Self> {
        if month_index > 11 {
            return Err(ArrearsError::invalid(format!(
                "month index {} out of range 0..=11",
                month_index
            )));
        }
        Ok(Self { year, month: month_index + 1 })
    }

    /// Period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1..=12
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_index(&self) -> u32 {
        self.month - 1
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Due date: `due_day` of the calendar month after the period.
    /// December rolls over into January of the next year.
    pub fn due_date(&self, due_day: u32) -> Result<NaiveDate> {
        let following = self.next();
        NaiveDate::from_ymd_opt(following.year, following.month, due_day).ok_or_else(|| {
            ArrearsError::invalid(format!(
                "no day {} in {}-{:02}",
                due_day, following.year, following.month
            ))
        })
    }

    /// Inclusive iterator from `self` to `end`; empty when `end` precedes `self`
    pub fn through(self, end: Period) -> impl Iterator<Item = Period> {
        let mut current = Some(self);
        std::iter::from_fn(move || {
            let period = current?;
            if period > end {
                current = None;
                return None;
            }
            current = Some(period.next());
            Some(period)
        })
    }

    /// Human-readable label, e.g. "Marzo 2024"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month_index() as usize], self.year)
    }

    /// Parse "Marzo 2024" (case-insensitive, "Setiembre" accepted) or "2024-03"
    pub fn parse_label(s: &str) -> Result<Self> {
        let trimmed = s.trim();

        if let Some((year, month)) = trimmed.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                return Self::new(year, month);
            }
        }

        let mut parts = trimmed.split_whitespace();
        let (name, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(year), None) => (name, year),
            _ => return Err(ArrearsError::parse(format!("malformed period label: {:?}", s))),
        };

        let name = name.to_lowercase();
        let month = MONTH_NAMES
            .iter()
            .position(|m| m.to_lowercase() == name)
            .or_else(|| (name == "setiembre").then_some(8))
            .ok_or_else(|| ArrearsError::parse(format!("unknown month name: {:?}", s)))?;

        let year: i32 = year
            .parse()
            .map_err(|_| ArrearsError::parse(format!("bad year in period label: {:?}", s)))?;

        Self::new(year, month as u32 + 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<Period> for String {
    fn from(period: Period) -> String {
        period.label()
    }
}

impl TryFrom<String> for Period {
    type Error = ArrearsError;

    fn try_from(label: String) -> Result<Self> {
        Self::parse_label(&label)
    }
}

impl FromStr for Period {
    type Err = ArrearsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_label(s)
    }
}

/// Parse a calendar date written as `YYYY-MM-DD` or `DD/MM/YYYY`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| ArrearsError::parse(format!("malformed date: {:?}", s)))
}

/// How a payment was made
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Check,
    Deposit,
    /// Anything else typed into the sheet, kept verbatim
    Other(String),
}

impl PaymentMethod {
    /// Label as written in the administration sheet
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Check => "Cheque",
            PaymentMethod::Deposit => "Deposito",
            PaymentMethod::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "efectivo" => PaymentMethod::Cash,
            "transferencia" => PaymentMethod::Transfer,
            "cheque" => PaymentMethod::Check,
            "deposito" | "depósito" => PaymentMethod::Deposit,
            _ => PaymentMethod::Other(label.trim().to_string()),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(PaymentMethod::from_label(&label))
    }
}

/// A recorded payment against one unit's billing period
///
/// Records are never edited; a new transaction produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unit identifier (parcela)
    pub unit: String,

    /// Billing period being settled
    pub period: Period,

    /// Date the money was received
    pub payment_date: NaiveDate,

    /// Amount received, in whole currency units
    pub amount_paid: f64,

    pub method: PaymentMethod,
}

impl PaymentRecord {
    pub fn new(
        unit: impl Into<String>,
        period: Period,
        payment_date: NaiveDate,
        amount_paid: f64,
        method: PaymentMethod,
    ) -> Self {
        Self {
            unit: unit.into(),
            period,
            payment_date,
            amount_paid,
            method,
        }
    }
}
