//! TIMC interest-rate table keyed by (year, month)

use crate::payments::Period;
use std::collections::BTreeMap;

/// Annual interest percentages by billing month
///
/// Sparse: a month without an entry has a 0% rate. A rate of 24 means
/// 24% per year, charged as 24/100/12 of the base fee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterestRateTable {
    rates: BTreeMap<(i32, u32), f64>,
}

impl InterestRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (year, month, percent) triples applied in order, so a
    /// repeated (year, month) keeps the last value
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, u32, f64)>,
    {
        let mut table = Self::new();
        for (year, month, percent) in entries {
            table.upsert(year, month, percent);
        }
        table
    }

    /// Insert or replace the rate for (year, month 1..=12).
    /// Returns the previous rate, if any.
    pub fn upsert(&mut self, year: i32, month: u32, percent: f64) -> Option<f64> {
        self.rates.insert((year, month), percent)
    }

    pub fn remove(&mut self, year: i32, month: u32) -> Option<f64> {
        self.rates.remove(&(year, month))
    }

    /// Configured percent for (year, month 1..=12), if any
    pub fn rate(&self, year: i32, month: u32) -> Option<f64> {
        self.rates.get(&(year, month)).copied()
    }

    /// Percent for a billing period, 0 when not configured
    pub fn rate_for(&self, period: Period) -> f64 {
        self.rate(period.year(), period.month()).unwrap_or(0.0)
    }

    /// Entries in (year, month) order
    pub fn entries(&self) -> impl Iterator<Item = (i32, u32, f64)> + '_ {
        self.rates.iter().map(|(&(y, m), &r)| (y, m, r))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
