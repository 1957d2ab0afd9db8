//! Per-unit statement over a range of billing periods

use crate::error::{ArrearsError, Result};
use crate::payments::{PaymentRecord, Period};
use crate::schedule::InterestRateTable;
use super::calculator::ArrearsCalculator;
use super::ledger::{closing_entries, LedgerEntry, LedgerSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All ledger lines for one unit between two periods, as of a date
///
/// Periods with payment records get one evaluated entry per record, each
/// settling what the earlier ones left owing. Periods without any get a
/// virtual entry: Pending before the due date, Delinquent
/// after it. Payments dated after `as_of` are not yet known and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStatement {
    pub unit: String,
    pub base_fee: f64,
    pub from: Period,
    pub to: Period,
    pub as_of: NaiveDate,
    pub entries: Vec<LedgerEntry>,
    pub summary: LedgerSummary,
}

impl UnitStatement {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        calculator: &ArrearsCalculator,
        unit: &str,
        base_fee: f64,
        from: Period,
        to: Period,
        as_of: NaiveDate,
        records: &[PaymentRecord],
        rates: &InterestRateTable,
    ) -> Result<Self> {
        if to < from {
            return Err(ArrearsError::invalid(format!(
                "statement range ends ({}) before it starts ({})",
                to, from
            )));
        }

        let unit = unit.trim();
        let mut own: Vec<&PaymentRecord> = records
            .iter()
            .filter(|r| r.unit.trim() == unit && r.payment_date <= as_of)
            .collect();
        own.sort_by_key(|r| (r.period, r.payment_date));

        let mut entries = Vec::new();
        for period in from.through(to) {
            let installments = own.iter().copied().filter(|r| r.period == period);
            let evaluated = calculator.evaluate_installments(installments, base_fee, rates)?;
            if evaluated.is_empty() {
                entries.push(calculator.preview(unit, base_fee, period, as_of, rates)?);
            } else {
                entries.extend(evaluated);
            }
        }

        let summary = LedgerSummary::from_ledger(&entries);

        Ok(Self {
            unit: unit.to_string(),
            base_fee,
            from,
            to,
            as_of,
            entries,
            summary,
        })
    }

    /// Closing entry of every period, one per period
    pub fn closing(&self) -> Vec<&LedgerEntry> {
        closing_entries(&self.entries)
    }

    /// Periods with money still owed after all their payments
    pub fn outstanding(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.closing().into_iter().filter(|e| e.pending_debt > 0.0)
    }

    pub fn total_pending_debt(&self) -> f64 {
        self.summary.total_pending_debt
    }

    /// Sum of positive balances left by overpayments
    pub fn total_credit(&self) -> f64 {
        self.closing().iter().map(|e| e.credit()).sum()
    }
}
