//! Load payment records from the payments sheet export (payments.csv)

use super::{parse_date, PaymentMethod, PaymentRecord, Period};
use crate::error::{ArrearsError, Result};
use csv::Reader;
use log::info;
use std::path::Path;

/// File name of the payments export inside the data directory
pub const PAYMENTS_FILE: &str = "payments.csv";

/// Raw CSV row matching the payments sheet columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Parcela")]
    unit: String,
    #[serde(rename = "Periodo")]
    period: String,
    #[serde(rename = "FechaPago")]
    payment_date: String,
    #[serde(rename = "Monto")]
    amount: String,
    #[serde(rename = "Metodo", default)]
    method: String,
}

impl CsvRow {
    fn to_record(self, line: usize) -> Result<PaymentRecord> {
        let unit = self.unit.trim().to_string();
        if unit.is_empty() {
            return Err(ArrearsError::parse(format!("row {}: empty Parcela", line)));
        }

        let period = Period::parse_label(&self.period)
            .map_err(|e| ArrearsError::parse(format!("row {}: {}", line, e)))?;
        let payment_date = parse_date(&self.payment_date)
            .map_err(|e| ArrearsError::parse(format!("row {}: {}", line, e)))?;
        let amount_paid = parse_amount(&self.amount)
            .map_err(|e| ArrearsError::parse(format!("row {}: {}", line, e)))?;

        Ok(PaymentRecord {
            unit,
            period,
            payment_date,
            amount_paid,
            method: PaymentMethod::from_label(&self.method),
        })
    }
}

/// Parse an amount as typed in the sheet: "70800", "$70.800", "70.800,50"
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && !c.is_whitespace()).collect();

    let normalized = if cleaned.contains(',') {
        // Comma is the decimal mark, dots group thousands
        cleaned.replace('.', "").replace(',', ".")
    } else if is_dot_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    let amount: f64 = normalized
        .parse()
        .map_err(|_| ArrearsError::parse(format!("malformed amount: {:?}", s)))?;
    if !amount.is_finite() {
        return Err(ArrearsError::parse(format!("malformed amount: {:?}", s)));
    }
    Ok(amount)
}

/// "70.800" or "1.250.000": every group after the first has exactly three digits
fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.trim_start_matches('-').split('.');
    let first = groups.next().unwrap_or("");
    let rest: Vec<&str> = groups.collect();
    !rest.is_empty()
        && !first.is_empty()
        && first.len() <= 3
        && first.chars().all(|c| c.is_ascii_digit())
        && rest.iter().all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Load all payment records from a CSV file
pub fn load_payments<P: AsRef<Path>>(path: P) -> Result<Vec<PaymentRecord>> {
    let reader = Reader::from_path(path.as_ref())?;
    let records = read_rows(reader)?;
    info!("Loaded {} payment records from {}", records.len(), path.as_ref().display());
    Ok(records)
}

/// Load payment records from any reader (e.g., string buffer, network stream)
pub fn load_payments_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PaymentRecord>> {
    read_rows(Reader::from_reader(reader))
}

/// Load payments.csv from a data directory
pub fn load_payments_in(dir: &Path) -> Result<Vec<PaymentRecord>> {
    load_payments(dir.join(PAYMENTS_FILE))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<PaymentRecord>> {
    let mut records = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        records.push(row.to_record(idx + 2)?);
    }

    Ok(records)
}
