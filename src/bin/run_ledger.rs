//! Evaluate every payment in data/payments.csv and build statements for all units
//!
//! Outputs ledger_output.csv and per-unit pending debt for review

use anyhow::{Context, Result};
use condo_arrears::arrears::write_ledger_csv;
use condo_arrears::notice::money;
use condo_arrears::payments::load_payments_in;
use condo_arrears::schedule::DEFAULT_DATA_PATH;
use condo_arrears::{LedgerRunner, LedgerSummary, Period};
use std::fs::File;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    let start = Instant::now();
    let data_dir = Path::new(DEFAULT_DATA_PATH);

    println!("Loading schedule and payments from {}...", data_dir.display());
    let runner = LedgerRunner::from_csv_path(data_dir).context("Failed to load schedule")?;
    let payments = load_payments_in(data_dir).context("Failed to load payments")?;
    println!(
        "Loaded {} units, {} TIMC rows, {} payments in {:?}",
        runner.snapshot().fees.len(),
        runner.snapshot().rates.len(),
        payments.len(),
        start.elapsed()
    );

    let eval_start = Instant::now();
    let entries = runner.evaluate_batch(&payments)?;
    println!("Evaluated {} payments in {:?}", entries.len(), eval_start.elapsed());

    let output_path = "ledger_output.csv";
    let file = File::create(output_path).context("Failed to create output file")?;
    write_ledger_csv(file, &entries)?;
    println!("Output written to {}", output_path);

    let summary = LedgerSummary::from_ledger(&entries);
    println!("\nPayments Summary:");
    println!("  Paid: {}  Partial: {}", summary.paid, summary.partial);
    println!("  Collected: {}", money(summary.total_paid));
    println!("  Interest:  {}", money(summary.total_interest));
    println!("  Penalties: {}", money(summary.total_penalty));
    println!("  Shortfall: {}", money(summary.total_pending_debt));

    // Statements from the earliest billed period through the current month
    let today = chrono::Local::now().date_naive();
    let last = Period::containing(today);
    if let Some(first) = payments.iter().map(|p| p.period).min().filter(|first| *first <= last) {
        let statements = runner.statements(first, last, today, &payments)?;

        println!("\nPending debt by unit (as of {}):", today);
        for statement in &statements {
            println!(
                "  Parcela {:<8} {:>12}  ({} delinquent, {} partial)",
                statement.unit,
                money(statement.total_pending_debt()),
                statement.summary.delinquent,
                statement.summary.partial
            );
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
