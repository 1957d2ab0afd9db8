//! Arrears calculation: late fees, ledger entries and unit statements

mod calculator;
mod ledger;
mod statement;

pub use calculator::{months_overdue, ArrearsCalculator, SETTLEMENT_TOLERANCE};
pub use ledger::{closing_entries, write_ledger_csv, LedgerEntry, LedgerStatus, LedgerSummary};
pub use statement::UnitStatement;
