//! Condo Arrears CLI
//!
//! Command-line interface for quoting, evaluating and reporting common-expense arrears

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use condo_arrears::arrears::write_ledger_csv;
use condo_arrears::notice::{arrears_reminder, money, payment_receipt, short_date};
use condo_arrears::payments::{load_payments_in, parse_date};
use condo_arrears::schedule::loader::{load_rates, save_rates};
use condo_arrears::schedule::DEFAULT_DATA_PATH;
use condo_arrears::{InterestRateTable, LedgerEntry, LedgerRunner, LedgerSummary, Period, UnitStatement};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "condo_arrears", version, about = "Common-expense arrears for condominium administration")]
struct Cli {
    /// Directory holding fees.csv, rates.csv and payments.csv
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one unit's period, optionally against a payment amount
    Quote {
        #[arg(long)]
        unit: String,
        /// Billing period, e.g. "Marzo 2024" or 2024-03
        #[arg(long)]
        period: String,
        /// Payment or evaluation date (default: today)
        #[arg(long)]
        as_of: Option<String>,
        /// Amount paid; omit to preview an unpaid period
        #[arg(long)]
        paid: Option<f64>,
        /// Print the receipt email body as well
        #[arg(long)]
        receipt: bool,
    },
    /// Evaluate every recorded payment
    Ledger {
        /// Write CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Statement for one unit over a range of periods
    Statement {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Print the arrears reminder email for a unit
    Notice {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Insert or replace a TIMC rate in rates.csv
    SetRate {
        #[arg(long)]
        year: i32,
        /// Month 1..=12
        #[arg(long)]
        month: u32,
        /// Annual percent, e.g. 24
        #[arg(long)]
        rate: f64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_path();

    match cli.command {
        Commands::Quote { unit, period, as_of, paid, receipt } => {
            let runner = load_runner(data_dir)?;
            let period = parse_period(&period)?;
            let on = resolve_date(as_of.as_deref())?;
            let entry = runner.quote(&unit, period, on, paid)?;
            print_entry(&entry);
            if receipt && entry.amount_paid.is_some() {
                let notice = payment_receipt(&entry);
                println!("\nAsunto: {}\n\n{}", notice.subject, notice.body);
            }
        }
        Commands::Ledger { output, json } => {
            let runner = load_runner(data_dir)?;
            let payments = load_payments_in(data_dir)
                .with_context(|| format!("loading payments from {}", data_dir.display()))?;
            let entries = runner.evaluate_batch(&payments)?;

            match (output, json) {
                (Some(path), false) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_ledger_csv(file, &entries)?;
                    println!("Ledger written to: {}", path.display());
                }
                (Some(path), true) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    serde_json::to_writer_pretty(file, &entries)?;
                    println!("Ledger written to: {}", path.display());
                }
                (None, false) => write_ledger_csv(io::stdout().lock(), &entries)?,
                (None, true) => {
                    let mut out = io::stdout().lock();
                    serde_json::to_writer_pretty(&mut out, &entries)?;
                    writeln!(out)?;
                }
            }

            print_summary(&LedgerSummary::from_ledger(&entries));
        }
        Commands::Statement { unit, from, to, as_of } => {
            let statement = build_statement(data_dir, &unit, &from, &to, as_of.as_deref())?;
            print_statement(&statement);
        }
        Commands::Notice { unit, from, to, as_of } => {
            let statement = build_statement(data_dir, &unit, &from, &to, as_of.as_deref())?;
            match arrears_reminder(&statement) {
                Some(notice) => println!("Asunto: {}\n\n{}", notice.subject, notice.body),
                None => println!("Parcela {} no registra deuda al {}", statement.unit, short_date(statement.as_of)),
            }
        }
        Commands::SetRate { year, month, rate } => {
            if !(1..=12).contains(&month) {
                bail!("month {} out of range 1..=12", month);
            }
            if !rate.is_finite() || rate < 0.0 {
                bail!("rate {} must be a non-negative number", rate);
            }
            let mut table = InterestRateTable::from_entries(
                load_rates(data_dir).with_context(|| format!("loading rates from {}", data_dir.display()))?,
            );
            match table.upsert(year, month, rate) {
                Some(previous) => println!("TIMC {}-{:02}: {} -> {}", year, month, previous, rate),
                None => println!("TIMC {}-{:02}: {} (new)", year, month, rate),
            }
            save_rates(data_dir, &table)?;
        }
    }

    Ok(())
}

fn load_runner(data_dir: &Path) -> Result<LedgerRunner> {
    LedgerRunner::from_csv_path(data_dir)
        .with_context(|| format!("loading fees and rates from {}", data_dir.display()))
}

fn parse_period(label: &str) -> Result<Period> {
    Period::parse_label(label).with_context(|| format!("invalid period {:?}", label))
}

fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => parse_date(s).with_context(|| format!("invalid date {:?}", s)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn build_statement(
    data_dir: &Path,
    unit: &str,
    from: &str,
    to: &str,
    as_of: Option<&str>,
) -> Result<UnitStatement> {
    let runner = load_runner(data_dir)?;
    let payments = load_payments_in(data_dir)
        .with_context(|| format!("loading payments from {}", data_dir.display()))?;
    let statement = runner.statement(
        unit,
        parse_period(from)?,
        parse_period(to)?,
        resolve_date(as_of)?,
        &payments,
    )?;
    Ok(statement)
}

fn print_entry(entry: &LedgerEntry) {
    println!("Parcela {} - {}", entry.unit, entry.period);
    println!("  Due date:       {}", short_date(entry.due_date));
    println!("  Evaluated on:   {}", short_date(entry.evaluated_on));
    println!("  Base fee:       {}", money(entry.base_fee));
    println!("  Months overdue: {}", entry.months_overdue);
    println!("  TIMC:           {}%", entry.rate_percent);
    println!("  Interest:       {}", money(entry.interest));
    println!("  Penalty:        {}", money(entry.penalty));
    println!("  Debt:           {}", money(entry.debt));
    if let Some(paid) = entry.amount_paid {
        println!("  Paid:           {}", money(paid));
    }
    println!("  Balance:        {}", money(entry.balance));
    println!("  Pending debt:   {}", money(entry.pending_debt));
    println!("  Status:         {}", entry.status);
}

fn print_statement(statement: &UnitStatement) {
    println!(
        "Parcela {} - cuota base {} - al {}",
        statement.unit,
        money(statement.base_fee),
        short_date(statement.as_of)
    );
    println!(
        "{:<16} {:>10} {:>10} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
        "Period", "Due", "Date", "MO", "Interest", "Penalty", "Debt", "Paid", "Pending", "Status"
    );
    println!("{}", "-".repeat(112));
    for e in &statement.entries {
        println!(
            "{:<16} {:>10} {:>10} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
            e.period.label(),
            short_date(e.due_date),
            short_date(e.evaluated_on),
            e.months_overdue,
            money(e.interest),
            money(e.penalty),
            money(e.debt),
            e.amount_paid.map(money).unwrap_or_default(),
            money(e.pending_debt),
            e.status,
        );
    }
    print_summary(&statement.summary);
}

fn print_summary(summary: &LedgerSummary) {
    eprintln!("\nSummary:");
    eprintln!("  Entries:        {}", summary.entries);
    eprintln!(
        "  Paid/Partial/Delinquent/Pending: {}/{}/{}/{}",
        summary.paid, summary.partial, summary.delinquent, summary.pending
    );
    eprintln!("  Total debt:     {}", money(summary.total_debt));
    eprintln!("  Total paid:     {}", money(summary.total_paid));
    eprintln!("  Total interest: {}", money(summary.total_interest));
    eprintln!("  Total penalty:  {}", money(summary.total_penalty));
    eprintln!("  Pending debt:   {}", money(summary.total_pending_debt));
}
