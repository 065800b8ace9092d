//! fxenrich CLI - enrich bank transactions with SGD FX rates
//!
//! # Commands
//!
//! ```bash
//! fxenrich run                                  # Locations from FXENRICH_* env / .env
//! fxenrich run --transactions banktxn/ --rates rates/ --output processed.csv
//! fxenrich run --dry-run                        # Print enriched rows as JSON, write nothing
//! fxenrich check-rates rates/                   # Report unusable rows and duplicate keys
//! fxenrich normalize-date 05-Jan-23 31-Dec-99   # Show how value dates are keyed
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fxenrich::config::{ConfigOverrides, DuplicatePolicy, JobConfig};
use fxenrich::logs::{log_error, log_success, log_warning};
use fxenrich::models::CANONICAL_DATE_FORMAT;
use fxenrich::storage::{DatasetStore, LocalStore};
use fxenrich::{normalize_value_date, preview_batch, run_batch, JobContext, RateIndex};

#[derive(Parser)]
#[command(name = "fxenrich")]
#[command(about = "Enrich bank transactions with FX rates and convert amounts to SGD", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enrichment batch
    Run {
        /// Transaction dataset (file or directory)
        #[arg(short, long)]
        transactions: Option<String>,

        /// Rate dataset (file or directory)
        #[arg(short, long)]
        rates: Option<String>,

        /// Output file, overwritten (.json for JSON, CSV otherwise)
        #[arg(short, long)]
        output: Option<String>,

        /// Execution-context name shown in logs
        #[arg(long)]
        app_name: Option<String>,

        /// What to do with duplicated rate keys: reject | fan-out
        #[arg(long)]
        on_duplicate_rates: Option<String>,

        /// Print enriched rows as JSON instead of writing the output
        #[arg(long)]
        dry_run: bool,
    },

    /// Check a rate dataset for unusable rows and duplicated keys
    CheckRates {
        /// Rate dataset (file or directory)
        rates: PathBuf,
    },

    /// Show the canonical date for raw value dates
    NormalizeDate {
        /// Raw dates in dd-Mon-yy form
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            transactions,
            rates,
            output,
            app_name,
            on_duplicate_rates,
            dry_run,
        } => cmd_run(transactions, rates, output, app_name, on_duplicate_rates, dry_run),

        Commands::CheckRates { rates } => cmd_check_rates(&rates),

        Commands::NormalizeDate { values } => cmd_normalize_date(&values),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_run(
    transactions: Option<String>,
    rates: Option<String>,
    output: Option<String>,
    app_name: Option<String>,
    on_duplicate_rates: Option<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let flags = ConfigOverrides {
        app_name,
        transactions,
        rates,
        output,
        duplicate_policy: on_duplicate_rates
            .map(|p| p.parse::<DuplicatePolicy>())
            .transpose()?,
    };
    let config = JobConfig::from_env_with(flags)?;
    let ctx = JobContext::new(config, LocalStore::new());

    if dry_run {
        let outcome = preview_batch(&ctx)?;
        let records: Vec<serde_json::Value> = outcome
            .table
            .rows
            .iter()
            .map(|row| row.to_json(&outcome.table.headers))
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let report = run_batch(&ctx)?;
    eprintln!("{}", serde_json::to_string_pretty(&report)?);
    log_success("✨ Done!");
    Ok(())
}

fn cmd_check_rates(rates: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let location = rates.to_string_lossy().to_string();
    let raw = LocalStore::new().read_rates(&location)?;
    let index = RateIndex::from_raw(&raw);

    log_success(format!(
        "{} usable rate rows, {} distinct (run_date, target_currency) keys",
        index.rate_rows(),
        index.key_count()
    ));
    if index.unusable_rows() > 0 {
        log_warning(format!("{} rows skipped (unparseable date, currency or rate)", index.unusable_rows()));
    }

    let duplicates = index.duplicate_keys();
    if duplicates.is_empty() {
        log_success("No duplicated keys");
        return Ok(());
    }

    for (key, count) in &duplicates {
        println!("{}\t{}\t{}", key.date.format(CANONICAL_DATE_FORMAT), key.currency, count);
    }
    Err(format!("{} duplicated keys", duplicates.len()).into())
}

fn cmd_normalize_date(values: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for value in values {
        let normalized = normalize_value_date(value)
            .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
            .unwrap_or_else(|| "null".to_string());
        println!("{}\t{}", value, normalized);
    }
    Ok(())
}
