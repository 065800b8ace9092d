//! Batch pipeline: read, normalize, join, convert, write.
//!
//! [`enrich`] is the pure core: it takes both datasets in memory and returns
//! the enriched table plus row accounting. [`run_batch`] wraps it with the
//! storage reads and the final overwrite, using the store carried by a
//! [`JobContext`].
//!
//! # Example
//!
//! ```rust,ignore
//! use fxenrich::{run_batch, JobConfig, JobContext, LocalStore};
//!
//! let config = JobConfig::new("data/banktxn", "data/rates", "out/processed.csv");
//! let ctx = JobContext::new(config, LocalStore::new());
//! let report = run_batch(&ctx)?;
//! println!("{} rows written", report.rows_written);
//! ```

use serde::Serialize;
use uuid::Uuid;

use crate::config::{DuplicatePolicy, JobConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{drain, LogLevel, RunLog};
use crate::models::{EnrichedTable, RawFxRate, TransactionTable};
use crate::normalize::normalize_transaction;
use crate::storage::DatasetStore;

use super::convert::convert;
use super::join::{join_rates, RateIndex, RateKey, SideStats};

/// How many duplicate keys to name in errors and logs.
const DUPLICATE_SAMPLE: usize = 3;

/// Execution environment of one batch run.
#[derive(Debug)]
pub struct JobContext<S: DatasetStore> {
    pub run_id: Uuid,
    pub config: JobConfig,
    pub store: S,
    /// Log of this run; [`run_batch`] collects its warnings into the report
    pub log: RunLog,
}

impl<S: DatasetStore> JobContext<S> {
    pub fn new(config: JobConfig, store: S) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
            store,
            log: RunLog::new(),
        }
    }
}

/// Row accounting for one enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichStats {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Transactions whose value date could not be parsed
    pub malformed_dates: usize,
    /// Usable rate rows
    pub rate_rows: usize,
    /// Rate rows skipped because a field could not be parsed
    pub unusable_rate_rows: usize,
    /// Keys with more than one rate
    pub duplicate_rate_keys: usize,
    pub withdrawal: SideStats,
    pub deposit: SideStats,
}

/// Result of [`enrich`].
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    pub table: EnrichedTable,
    pub stats: EnrichStats,
    /// Duplicated keys with their rate counts (only non-empty under fan-out)
    pub duplicate_keys: Vec<(RateKey, usize)>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub app_name: String,
    pub output: String,
    pub rows_written: usize,
    pub stats: EnrichStats,
    /// Warnings logged during the run
    pub warnings: Vec<String>,
}

fn sample_keys(keys: &[(RateKey, usize)]) -> String {
    let mut sample: Vec<String> = keys
        .iter()
        .take(DUPLICATE_SAMPLE)
        .map(|(key, n)| format!("{} x{}", key, n))
        .collect();
    if keys.len() > DUPLICATE_SAMPLE {
        sample.push(format!("... +{}", keys.len() - DUPLICATE_SAMPLE));
    }
    sample.join(", ")
}

/// Enrich `transactions` with `rates`.
///
/// Per-row problems never fail: they show up as absent rates and zero
/// amounts, and are counted in [`EnrichStats`]. The only error is a
/// duplicated rate key under [`DuplicatePolicy::Reject`].
pub fn enrich(
    transactions: TransactionTable,
    rates: &[RawFxRate],
    policy: DuplicatePolicy,
) -> PipelineResult<EnrichOutcome> {
    let index = RateIndex::from_raw(rates);
    let duplicate_keys = index.duplicate_keys();
    if !duplicate_keys.is_empty() && policy == DuplicatePolicy::Reject {
        return Err(PipelineError::DuplicateRates {
            count: duplicate_keys.len(),
            sample: sample_keys(&duplicate_keys),
        });
    }

    let input_rows = transactions.rows.len();
    let normalized: Vec<_> = transactions.rows.into_iter().map(normalize_transaction).collect();
    let malformed_dates = normalized.iter().filter(|t| t.value_date.is_none()).count();

    let joined = join_rates(normalized, &index);
    let rows: Vec<_> = joined.rows.into_iter().map(convert).collect();

    let stats = EnrichStats {
        input_rows,
        output_rows: rows.len(),
        malformed_dates,
        rate_rows: index.rate_rows(),
        unusable_rate_rows: index.unusable_rows(),
        duplicate_rate_keys: duplicate_keys.len(),
        withdrawal: joined.withdrawal,
        deposit: joined.deposit,
    };

    Ok(EnrichOutcome {
        table: EnrichedTable {
            headers: transactions.headers,
            rows,
        },
        stats,
        duplicate_keys,
    })
}

/// Read both datasets through the context's store and enrich them.
pub fn preview_batch<S: DatasetStore>(ctx: &JobContext<S>) -> PipelineResult<EnrichOutcome> {
    let config = &ctx.config;
    let log = &ctx.log;
    log.info(format!("🚀 {} (run {})", config.app_name, ctx.run_id));

    log.info(format!("📖 Reading transactions from {}", config.transactions));
    let transactions = ctx.store.read_transactions(&config.transactions)?;
    log.success(format!("Read {} transactions", transactions.rows.len()));

    log.info(format!("📖 Reading rates from {}", config.rates));
    let rates = ctx.store.read_rates(&config.rates)?;
    log.success(format!("Read {} rate rows", rates.len()));

    log.info("⚙️  Enriching...");
    let outcome = enrich(transactions, &rates, config.duplicate_policy)?;
    print_stats(log, &outcome);

    Ok(outcome)
}

/// Run the whole batch and overwrite the output location.
///
/// Nothing is written unless every earlier step succeeded.
pub fn run_batch<S: DatasetStore>(ctx: &JobContext<S>) -> PipelineResult<RunReport> {
    let mut rx = ctx.log.subscribe();
    let outcome = preview_batch(ctx)?;

    ctx.log.info(format!("💾 Writing {}", ctx.config.output));
    let rows_written = ctx.store.write_enriched(&ctx.config.output, &outcome.table)?;
    ctx.log.success(format!("Wrote {} rows", rows_written));

    let warnings = drain(&mut rx)
        .into_iter()
        .filter(|entry| entry.level == LogLevel::Warning)
        .map(|entry| entry.message)
        .collect();

    Ok(RunReport {
        run_id: ctx.run_id,
        app_name: ctx.config.app_name.clone(),
        output: ctx.config.output.clone(),
        rows_written,
        stats: outcome.stats,
        warnings,
    })
}

fn print_stats(log: &RunLog, outcome: &EnrichOutcome) {
    let stats = &outcome.stats;

    if stats.unusable_rate_rows > 0 {
        log.warning(format!("{} rate rows skipped (unparseable date, currency or rate)", stats.unusable_rate_rows));
    }
    if !outcome.duplicate_keys.is_empty() {
        log.warning(format!(
            "{} duplicated rate keys, rows fanned out: {}",
            outcome.duplicate_keys.len(),
            sample_keys(&outcome.duplicate_keys)
        ));
    }
    if stats.malformed_dates > 0 {
        log.warning(format!("{} transactions with malformed value_date (left unenriched)", stats.malformed_dates));
    }

    for (label, side) in [("withdrawal", &stats.withdrawal), ("deposit", &stats.deposit)] {
        log.info_indent(
            format!(
                "{}: {} matched, {} without rate, {} without currency/date",
                label, side.matched, side.unmatched, side.absent_key
            ),
            1,
        );
        if side.fan_out > 0 {
            log.warning(format!("{}: {} extra rows from duplicate rates", label, side.fan_out));
        }
    }

    log.success(format!("{} rows enriched from {} transactions", stats.output_rows, stats.input_rows));
}
