//! Billing inputs: base fees per unit, TIMC rates and billing rules

mod fees;
mod rates;
mod rules;
pub mod loader;

pub use fees::FeeSchedule;
pub use rates::InterestRateTable;
pub use rules::{BillingRules, DEFAULT_DUE_DAY, DEFAULT_PENALTY_FRACTION};
pub use loader::{LoadedSchedule, DEFAULT_DATA_PATH};

use crate::error::Result;
use std::path::Path;

/// Immutable snapshot of everything the calculator reads besides the
/// payment itself
#[derive(Debug, Clone, Default)]
pub struct BillingSnapshot {
    pub fees: FeeSchedule,
    pub rates: InterestRateTable,
    pub rules: BillingRules,
}

impl BillingSnapshot {
    pub fn new(fees: FeeSchedule, rates: InterestRateTable, rules: BillingRules) -> Self {
        Self { fees, rates, rules }
    }

    /// Load fees and rates from CSV files in the default location (data/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(DEFAULT_DATA_PATH))
    }

    /// Load fees and rates from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedSchedule::load_from(path)?;

        Ok(Self {
            fees: FeeSchedule::from_loaded(&loaded.fees),
            rates: InterestRateTable::from_entries(loaded.rates),
            rules: BillingRules::default(),
        })
    }

    pub fn with_rules(mut self, rules: BillingRules) -> Self {
        self.rules = rules;
        self
    }
}
