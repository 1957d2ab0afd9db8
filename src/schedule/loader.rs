//! CSV-based schedule loader
//!
//! Loads fee and interest-rate tables exported from the administration sheet.

use crate::error::{ArrearsError, Result};
use crate::payments::loader::parse_amount;
use super::InterestRateTable;
use log::{info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the data directory
pub const DEFAULT_DATA_PATH: &str = "data";

pub const FEES_FILE: &str = "fees.csv";
pub const RATES_FILE: &str = "rates.csv";

/// Load base fees from CSV
/// Returns Vec<(unit, fee)> in file order
pub fn load_fees_from_reader<R: Read>(reader: R) -> Result<Vec<(String, f64)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut fees = Vec::new();

    for result in reader.records() {
        let record = result?;
        let unit = record.get(0).unwrap_or("").trim().to_string();
        if unit.is_empty() {
            warn!("Skipping fee row without a unit: {:?}", record);
            continue;
        }
        let fee = parse_amount(record.get(1).unwrap_or(""))?;
        fees.push((unit, fee));
    }

    Ok(fees)
}

pub fn load_fees(path: &Path) -> Result<Vec<(String, f64)>> {
    let file = File::open(path.join(FEES_FILE))?;
    load_fees_from_reader(file)
}

/// Load TIMC rates from CSV
/// Returns Vec<(year, month, percent)> in file order
pub fn load_rates_from_reader<R: Read>(reader: R) -> Result<Vec<(i32, u32, f64)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rates = Vec::new();

    for result in reader.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let year: i32 = field(0)
            .parse()
            .map_err(|_| ArrearsError::parse(format!("bad year in rate row: {:?}", record)))?;
        let month: u32 = field(1)
            .parse()
            .map_err(|_| ArrearsError::parse(format!("bad month in rate row: {:?}", record)))?;
        if !(1..=12).contains(&month) {
            return Err(ArrearsError::parse(format!("month {} out of range in rate row", month)));
        }
        let percent: f64 = field(2)
            .replace(',', ".")
            .trim_end_matches('%')
            .parse()
            .map_err(|_| ArrearsError::parse(format!("bad rate in rate row: {:?}", record)))?;

        rates.push((year, month, percent));
    }

    Ok(rates)
}

pub fn load_rates(path: &Path) -> Result<Vec<(i32, u32, f64)>> {
    let file = File::open(path.join(RATES_FILE))?;
    load_rates_from_reader(file)
}

/// Write the rate table back to `rates.csv` in (year, month) order
pub fn save_rates(path: &Path, table: &InterestRateTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.join(RATES_FILE))?;
    writer.write_record(["Anio", "Mes", "TIMC"])?;
    for (year, month, percent) in table.entries() {
        writer.write_record([year.to_string(), month.to_string(), percent.to_string()])?;
    }
    writer.flush()?;
    info!("Saved {} TIMC entries to {}", table.len(), path.join(RATES_FILE).display());
    Ok(())
}

/// All schedule tables loaded from a data directory
pub struct LoadedSchedule {
    pub fees: Vec<(String, f64)>,
    pub rates: Vec<(i32, u32, f64)>,
}

impl LoadedSchedule {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_DATA_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let loaded = Self {
            fees: load_fees(path)?,
            rates: load_rates(path)?,
        };
        info!(
            "Loaded {} fees and {} TIMC rows from {}",
            loaded.fees.len(),
            loaded.rates.len(),
            path.display()
        );
        Ok(loaded)
    }
}
