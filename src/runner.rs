//! Ledger runner for batch evaluation
//!
//! Pre-loads the billing snapshot once, then evaluates payment records and
//! builds unit statements without re-reading CSV files.

use crate::arrears::{ArrearsCalculator, LedgerEntry, UnitStatement};
use crate::error::Result;
use crate::payments::{PaymentRecord, Period};
use crate::schedule::BillingSnapshot;
use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Pre-loaded runner over one billing snapshot
///
/// # Example
/// ```ignore
/// let runner = LedgerRunner::from_csv()?;
/// let payments = load_payments_in(Path::new("data"))?;
/// let entries = runner.evaluate_batch(&payments)?;
/// ```
#[derive(Debug, Clone)]
pub struct LedgerRunner {
    snapshot: BillingSnapshot,
    calculator: ArrearsCalculator,
}

impl LedgerRunner {
    pub fn new(snapshot: BillingSnapshot) -> Result<Self> {
        let calculator = ArrearsCalculator::new(snapshot.rules.clone())?;
        Ok(Self { snapshot, calculator })
    }

    /// Create runner by loading fees and rates from data/
    pub fn from_csv() -> Result<Self> {
        Self::new(BillingSnapshot::from_csv()?)
    }

    /// Create runner from a specific data directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self> {
        Self::new(BillingSnapshot::from_csv_path(path)?)
    }

    pub fn snapshot(&self) -> &BillingSnapshot {
        &self.snapshot
    }

    pub fn calculator(&self) -> &ArrearsCalculator {
        &self.calculator
    }

    /// Evaluate one recorded payment using the unit's scheduled fee
    pub fn evaluate(&self, record: &PaymentRecord) -> Result<LedgerEntry> {
        let fee = self.snapshot.fees.require_fee(&record.unit)?;
        self.calculator.evaluate_payment(record, fee, &self.snapshot.rates)
    }

    /// Evaluate a period for a unit, with or without a payment amount
    pub fn quote(
        &self,
        unit: &str,
        period: Period,
        on: NaiveDate,
        amount_paid: Option<f64>,
    ) -> Result<LedgerEntry> {
        let fee = self.snapshot.fees.require_fee(unit)?;
        self.calculator
            .assess(unit.trim(), fee, period, on, &self.snapshot.rates, amount_paid)
    }

    /// Evaluate all records, preserving input order.
    ///
    /// Records for the same unit and period are applied as installments in
    /// payment-date order (input order breaks ties); separate periods are
    /// evaluated in parallel. Fails on the first record that cannot be evaluated.
    pub fn evaluate_batch(&self, records: &[PaymentRecord]) -> Result<Vec<LedgerEntry>> {
        info!("Evaluating {} payment records", records.len());

        let mut groups: BTreeMap<(&str, Period), Vec<usize>> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            groups.entry((record.unit.trim(), record.period)).or_default().push(i);
        }
        let groups: Vec<Vec<usize>> = groups
            .into_values()
            .map(|mut indices| {
                indices.sort_by_key(|&i| (records[i].payment_date, i));
                indices
            })
            .collect();

        let evaluated: Vec<Vec<(usize, LedgerEntry)>> = groups
            .par_iter()
            .map(|indices| self.evaluate_group(records, indices))
            .collect::<Result<_>>()?;

        let mut slots: Vec<Option<LedgerEntry>> = vec![None; records.len()];
        for (i, entry) in evaluated.into_iter().flatten() {
            slots[i] = Some(entry);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    fn evaluate_group(&self, records: &[PaymentRecord], indices: &[usize]) -> Result<Vec<(usize, LedgerEntry)>> {
        let Some(&first) = indices.first() else {
            return Ok(Vec::new());
        };
        let fee = self.snapshot.fees.require_fee(&records[first].unit)?;
        let entries = self.calculator.evaluate_installments(
            indices.iter().map(|&i| &records[i]),
            fee,
            &self.snapshot.rates,
        )?;
        Ok(indices.iter().copied().zip(entries).collect())
    }

    /// Statement for one unit
    pub fn statement(
        &self,
        unit: &str,
        from: Period,
        to: Period,
        as_of: NaiveDate,
        records: &[PaymentRecord],
    ) -> Result<UnitStatement> {
        let fee = self.snapshot.fees.require_fee(unit)?;
        UnitStatement::build(&self.calculator, unit, fee, from, to, as_of, records, &self.snapshot.rates)
    }

    /// Statements for every unit in the fee schedule, in unit order
    pub fn statements(
        &self,
        from: Period,
        to: Period,
        as_of: NaiveDate,
        records: &[PaymentRecord],
    ) -> Result<Vec<UnitStatement>> {
        let units: Vec<&str> = self.snapshot.fees.units().collect();
        info!("Building statements for {} units", units.len());
        units
            .par_iter()
            .map(|unit| self.statement(unit, from, to, as_of, records))
            .collect()
    }
}
