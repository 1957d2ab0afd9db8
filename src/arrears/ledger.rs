//! Ledger entries produced by the arrears calculator

use crate::error::Result;
use crate::payments::{PaymentMethod, Period};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Settlement status of one unit's billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LedgerStatus {
    /// Not yet due and not paid
    Pending,
    /// Paid in full (balance >= 0)
    Paid,
    /// Paid, but less than the debt
    PartialPayment,
    /// Past due with no payment recorded
    Delinquent,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Pending => "Pending",
            LedgerStatus::Paid => "Paid",
            LedgerStatus::PartialPayment => "PartialPayment",
            LedgerStatus::Delinquent => "Delinquent",
        }
    }

    /// Label shown to residents
    pub fn label_es(&self) -> &'static str {
        match self {
            LedgerStatus::Pending => "Pendiente",
            LedgerStatus::Paid => "Pagado",
            LedgerStatus::PartialPayment => "Pago parcial",
            LedgerStatus::Delinquent => "Moroso",
        }
    }

    /// Whether money is still owed for the period
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, LedgerStatus::Paid)
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived ledger line for one unit and period
///
/// Amounts keep full precision; round only when presenting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub unit: String,
    pub period: Period,
    pub due_date: NaiveDate,

    /// Payment date, or the as-of date for a period without payment
    pub evaluated_on: NaiveDate,

    pub base_fee: f64,

    /// Present only when a payment was evaluated
    pub amount_paid: Option<f64>,
    pub method: Option<PaymentMethod>,

    pub months_overdue: u32,

    /// TIMC percent applied (0 when on time or not configured)
    pub rate_percent: f64,

    pub interest: f64,
    pub penalty: f64,

    /// base_fee + interest + penalty
    pub debt: f64,

    /// amount_paid - debt; -debt for an unpaid period
    pub balance: f64,

    pub pending_debt: f64,
    pub status: LedgerStatus,
}

impl LedgerEntry {
    pub fn is_late(&self) -> bool {
        self.months_overdue > 0
    }

    /// Credit left over after settling the period
    pub fn credit(&self) -> f64 {
        self.balance.max(0.0)
    }

    fn to_row(&self) -> LedgerRow {
        LedgerRow {
            unit: self.unit.clone(),
            period: self.period.label(),
            due_date: self.due_date.to_string(),
            evaluated_on: self.evaluated_on.to_string(),
            base_fee: format!("{:.2}", self.base_fee),
            amount_paid: self.amount_paid.map(|a| format!("{:.2}", a)).unwrap_or_default(),
            method: self.method.as_ref().map(|m| m.to_string()).unwrap_or_default(),
            months_overdue: self.months_overdue,
            rate_percent: format!("{:.4}", self.rate_percent),
            interest: format!("{:.2}", self.interest),
            penalty: format!("{:.2}", self.penalty),
            debt: format!("{:.2}", self.debt),
            balance: format!("{:.2}", self.balance),
            pending_debt: format!("{:.2}", self.pending_debt),
            status: self.status.as_str(),
        }
    }
}

/// Flat CSV export row
#[derive(Debug, Serialize)]
struct LedgerRow {
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "DueDate")]
    due_date: String,
    #[serde(rename = "EvaluatedOn")]
    evaluated_on: String,
    #[serde(rename = "BaseFee")]
    base_fee: String,
    #[serde(rename = "AmountPaid")]
    amount_paid: String,
    #[serde(rename = "Method")]
    method: String,
    #[serde(rename = "MonthsOverdue")]
    months_overdue: u32,
    #[serde(rename = "RatePercent")]
    rate_percent: String,
    #[serde(rename = "Interest")]
    interest: String,
    #[serde(rename = "Penalty")]
    penalty: String,
    #[serde(rename = "Debt")]
    debt: String,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "PendingDebt")]
    pending_debt: String,
    #[serde(rename = "Status")]
    status: &'static str,
}

/// Write entries as CSV with a header row
pub fn write_ledger_csv<W: std::io::Write>(writer: W, entries: &[LedgerEntry]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(entry.to_row())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Last entry of each (unit, period), the one carrying the period's running balance
///
/// Ties on `evaluated_on` go to the later position, which is the order
/// installments on the same day are applied in.
pub fn closing_entries(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let mut last: BTreeMap<(&str, Period), &LedgerEntry> = BTreeMap::new();
    for entry in entries {
        match last.entry((entry.unit.trim(), entry.period)) {
            Entry::Occupied(mut slot) => {
                if entry.evaluated_on >= slot.get().evaluated_on {
                    slot.insert(entry);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }
    last.into_values().collect()
}

/// Totals across a set of ledger entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub entries: usize,
    pub pending: usize,
    pub paid: usize,
    pub partial: usize,
    pub delinquent: usize,
    pub total_base_fee: f64,
    pub total_interest: f64,
    pub total_penalty: f64,
    pub total_debt: f64,
    pub total_paid: f64,
    pub total_pending_debt: f64,
}

impl LedgerSummary {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut summary = Self::default();
        for entry in entries {
            summary.add(entry);
        }
        summary
    }

    /// Totals over a ledger that may hold several installments per period
    ///
    /// Status counts and debt totals come from each period's closing entry;
    /// `total_paid` adds up every installment.
    pub fn from_ledger(entries: &[LedgerEntry]) -> Self {
        let mut summary = Self::from_entries(closing_entries(entries));
        summary.total_paid = entries.iter().map(|e| e.amount_paid.unwrap_or(0.0)).sum();
        summary
    }

    pub fn add(&mut self, entry: &LedgerEntry) {
        self.entries += 1;
        match entry.status {
            LedgerStatus::Pending => self.pending += 1,
            LedgerStatus::Paid => self.paid += 1,
            LedgerStatus::PartialPayment => self.partial += 1,
            LedgerStatus::Delinquent => self.delinquent += 1,
        }
        self.total_base_fee += entry.base_fee;
        self.total_interest += entry.interest;
        self.total_penalty += entry.penalty;
        self.total_debt += entry.debt;
        self.total_paid += entry.amount_paid.unwrap_or(0.0);
        self.total_pending_debt += entry.pending_debt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: LedgerStatus, debt: f64, paid: Option<f64>, pending: f64) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        LedgerEntry {
            unit: "12".to_string(),
            period: Period::new(2024, 1).unwrap(),
            due_date: date,
            evaluated_on: date,
            base_fee: 40_000.0,
            amount_paid: paid,
            method: paid.map(|_| PaymentMethod::Transfer),
            months_overdue: 0,
            rate_percent: 0.0,
            interest: 0.0,
            penalty: debt - 40_000.0,
            debt,
            balance: paid.unwrap_or(0.0) - debt,
            pending_debt: pending,
            status,
        }
    }

    #[test]
    fn test_summary_totals() {
        let entries = vec![
            entry(LedgerStatus::Paid, 40_000.0, Some(40_000.0), 0.0),
            entry(LedgerStatus::PartialPayment, 50_000.0, Some(30_000.0), 20_000.0),
            entry(LedgerStatus::Delinquent, 50_000.0, None, 50_000.0),
            entry(LedgerStatus::Pending, 40_000.0, None, 0.0),
        ];
        let summary = LedgerSummary::from_entries(&entries);

        assert_eq!(summary.entries, 4);
        assert_eq!(summary.paid, 1);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.delinquent, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total_paid, 70_000.0);
        assert_eq!(summary.total_debt, 180_000.0);
        assert_eq!(summary.total_pending_debt, 70_000.0);
        assert_eq!(summary.total_penalty, 20_000.0);
    }

    #[test]
    fn test_ledger_summary_counts_each_period_once() {
        let mut first = entry(LedgerStatus::PartialPayment, 70_800.0, Some(50_000.0), 20_800.0);
        first.evaluated_on = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        let mut second = entry(LedgerStatus::Paid, 70_800.0, Some(20_800.0), 0.0);
        second.evaluated_on = first.evaluated_on;
        second.balance = 0.0;
        let mut other = entry(LedgerStatus::Paid, 40_000.0, Some(40_000.0), 0.0);
        other.period = Period::new(2024, 2).unwrap();

        let entries = vec![first, second, other];
        let closing = closing_entries(&entries);
        assert_eq!(closing.len(), 2);
        assert!(closing.iter().all(|e| e.status == LedgerStatus::Paid));

        let summary = LedgerSummary::from_ledger(&entries);
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.paid, 2);
        assert_eq!(summary.partial, 0);
        assert_eq!(summary.total_debt, 110_800.0);
        assert_eq!(summary.total_paid, 110_800.0);
        assert_eq!(summary.total_pending_debt, 0.0);
    }

    #[test]
    fn test_write_csv() {
        let entries = vec![entry(LedgerStatus::Paid, 40_000.0, Some(40_000.0), 0.0)];
        let mut buf = Vec::new();
        write_ledger_csv(&mut buf, &entries).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Unit,Period,DueDate"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("12,Enero 2024,2024-02-10,2024-02-10,40000.00,40000.00,Transferencia,0,"));
        assert!(row.ends_with(",Paid"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(LedgerStatus::PartialPayment.to_string(), "PartialPayment");
        assert_eq!(LedgerStatus::Delinquent.label_es(), "Moroso");
        assert!(!LedgerStatus::Paid.is_outstanding());
        assert!(LedgerStatus::Pending.is_outstanding());
    }
}
