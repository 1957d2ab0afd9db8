//! Billing conventions applied by the arrears calculator

use crate::error::{ArrearsError, Result};
use serde::{Deserialize, Serialize};

/// Day of the following month on which a period falls due
pub const DEFAULT_DUE_DAY: u32 = 10;

/// Share of the base fee charged per overdue month
pub const DEFAULT_PENALTY_FRACTION: f64 = 0.25;

/// Billing rules for a condominium
///
/// The defaults are the administration's observed conventions: a period is
/// due on the 10th of the next month, and each overdue month adds a quarter
/// of the base fee. Arrears roll over to a new month on `due_day + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRules {
    /// Due day in the month following the billed period (1..=28)
    pub due_day: u32,

    /// Fraction of the base fee charged per month overdue
    pub penalty_fraction: f64,
}

impl Default for BillingRules {
    fn default() -> Self {
        Self {
            due_day: DEFAULT_DUE_DAY,
            penalty_fraction: DEFAULT_PENALTY_FRACTION,
        }
    }
}

impl BillingRules {
    /// Day of month from which an extra overdue month is counted
    pub fn rollover_day(&self) -> u32 {
        self.due_day + 1
    }

    /// Reject rules that would make due dates or penalties meaningless
    pub fn validate(&self) -> Result<()> {
        // Capped at 28 so every month has a due date
        if !(1..=28).contains(&self.due_day) {
            return Err(ArrearsError::invalid(format!(
                "due day {} out of range 1..=28",
                self.due_day
            )));
        }
        if !self.penalty_fraction.is_finite() || self.penalty_fraction < 0.0 {
            return Err(ArrearsError::invalid(format!(
                "penalty fraction {} must be a non-negative number",
                self.penalty_fraction
            )));
        }
        Ok(())
    }
}
