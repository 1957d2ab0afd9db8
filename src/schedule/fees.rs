//! Monthly base fee per unit

use crate::error::{ArrearsError, Result};
use std::collections::BTreeMap;

/// Base common-expense fee by unit (parcela)
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    fees: BTreeMap<String, f64>,
}

impl FeeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from loaded CSV data; later rows for the same unit replace earlier ones
    pub fn from_loaded(rows: &[(String, f64)]) -> Self {
        let mut schedule = Self::new();
        for (unit, fee) in rows {
            schedule.set_fee(unit.clone(), *fee);
        }
        schedule
    }

    pub fn set_fee(&mut self, unit: impl Into<String>, fee: f64) {
        let unit: String = unit.into();
        self.fees.insert(unit.trim().to_string(), fee);
    }

    /// Base fee for a unit, if one is configured
    pub fn fee(&self, unit: &str) -> Option<f64> {
        self.fees.get(unit.trim()).copied()
    }

    /// Base fee for a unit, or `UnknownUnit`
    pub fn require_fee(&self, unit: &str) -> Result<f64> {
        self.fee(unit)
            .ok_or_else(|| ArrearsError::UnknownUnit(unit.trim().to_string()))
    }

    /// Units in sorted order
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.fees.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}
