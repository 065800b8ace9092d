//! Domain models for the FX enrichment pipeline.
//!
//! Records move through the pipeline as a chain of owned values, one type
//! per stage:
//!
//! ```text
//! RawTransaction ─▶ Transaction ─▶ JoinedTransaction ─▶ EnrichedTransaction
//!  (source text)    (normalized)    (+ side rates)       (+ SGD amounts)
//! ```
//!
//! - [`RawTransaction`] / [`TransactionTable`] - Bank statement lines as read
//! - [`Transaction`] - Date and currency keys normalized
//! - [`RawFxRate`] / [`FxRate`] - Rate rows as read and as usable
//! - [`JoinedTransaction`] - A transaction with the rate found for each side
//! - [`EnrichedTransaction`] / [`EnrichedTable`] - Final output rows

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Column names
// =============================================================================

pub const VALUE_DATE: &str = "value_date";
pub const WITHDRAWAL_CURRENCY: &str = "withdrawal_currency";
pub const DEPOSIT_CURRENCY: &str = "deposit_currency";
pub const WITHDRAWAL_AMT: &str = "withdrawal_amt";
pub const DEPOSIT_AMT: &str = "deposit_amt";

/// Columns every transaction dataset must carry.
pub const TRANSACTION_COLUMNS: [&str; 5] = [
    VALUE_DATE,
    WITHDRAWAL_CURRENCY,
    DEPOSIT_CURRENCY,
    WITHDRAWAL_AMT,
    DEPOSIT_AMT,
];

pub const RUN_DATE: &str = "run_date";
pub const TARGET_CURRENCY: &str = "target_currency";
pub const RATES_BASE_SGD: &str = "rates_base_sgd";

/// Columns every rate dataset must carry.
pub const RATE_COLUMNS: [&str; 3] = [RUN_DATE, TARGET_CURRENCY, RATES_BASE_SGD];

/// Columns appended to every output row, in output order.
pub const DERIVED_COLUMNS: [&str; 6] = [
    "withdrawal_sgd",
    "deposit_sgd",
    "withdrawal_sgd_amt",
    "deposit_sgd_amt",
    "withdrawal_rate_found",
    "deposit_rate_found",
];

/// Canonical date key format, shared by both datasets.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Transactions
// =============================================================================

/// A bank statement line exactly as read from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// `dd-Mon-yy`, e.g. `05-Jan-23`
    pub value_date: String,
    pub withdrawal_currency: String,
    pub deposit_currency: String,
    pub withdrawal_amt: String,
    pub deposit_amt: String,
    /// Every other source column, keyed by header name.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// A transaction dataset: source header order plus rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawTransaction>,
}

/// A transaction whose join keys have been normalized.
///
/// `None` means absent: an unparseable date or a blank currency. Absent keys
/// never match a rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub value_date: Option<NaiveDate>,
    pub withdrawal_currency: Option<String>,
    pub deposit_currency: Option<String>,
    /// Source text, kept unchanged for output; parsed at conversion time.
    pub withdrawal_amt: String,
    pub deposit_amt: String,
    pub extra: HashMap<String, String>,
}

/// A transaction with the rate found on each side, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTransaction {
    pub transaction: Transaction,
    pub withdrawal_sgd: Option<f64>,
    pub deposit_sgd: Option<f64>,
}

/// Final output row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub withdrawal_sgd: Option<f64>,
    pub deposit_sgd: Option<f64>,
    pub withdrawal_sgd_amt: f64,
    pub deposit_sgd_amt: f64,
}

impl EnrichedTransaction {
    /// Distinguishes "no rate" from "rate of zero" when the amount is 0.
    pub fn withdrawal_rate_found(&self) -> bool {
        self.withdrawal_sgd.is_some()
    }

    pub fn deposit_rate_found(&self) -> bool {
        self.deposit_sgd.is_some()
    }

    /// Text of a source column after normalization (`None` when absent).
    pub fn source_field(&self, column: &str) -> Option<String> {
        let txn = &self.transaction;
        match column {
            VALUE_DATE => txn
                .value_date
                .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string()),
            WITHDRAWAL_CURRENCY => txn.withdrawal_currency.clone(),
            DEPOSIT_CURRENCY => txn.deposit_currency.clone(),
            WITHDRAWAL_AMT => Some(txn.withdrawal_amt.clone()),
            DEPOSIT_AMT => Some(txn.deposit_amt.clone()),
            other => txn.extra.get(other).cloned(),
        }
    }

    /// CSV cells for `headers` followed by [`DERIVED_COLUMNS`]. Absent is "".
    pub fn to_csv_row(&self, headers: &[String]) -> Vec<String> {
        let mut row: Vec<String> = headers
            .iter()
            .map(|h| self.source_field(h).unwrap_or_default())
            .collect();
        row.push(self.withdrawal_sgd.map(|r| r.to_string()).unwrap_or_default());
        row.push(self.deposit_sgd.map(|r| r.to_string()).unwrap_or_default());
        row.push(self.withdrawal_sgd_amt.to_string());
        row.push(self.deposit_sgd_amt.to_string());
        row.push(self.withdrawal_rate_found().to_string());
        row.push(self.deposit_rate_found().to_string());
        row
    }

    /// JSON object with source columns and derived fields. Absent is `null`.
    pub fn to_json(&self, headers: &[String]) -> Value {
        let mut obj = Map::new();
        for header in headers {
            let value = match self.source_field(header) {
                Some(s) => json!(s),
                None => Value::Null,
            };
            obj.insert(header.clone(), value);
        }
        obj.insert("withdrawal_sgd".to_string(), json!(self.withdrawal_sgd));
        obj.insert("deposit_sgd".to_string(), json!(self.deposit_sgd));
        obj.insert("withdrawal_sgd_amt".to_string(), json!(self.withdrawal_sgd_amt));
        obj.insert("deposit_sgd_amt".to_string(), json!(self.deposit_sgd_amt));
        obj.insert("withdrawal_rate_found".to_string(), json!(self.withdrawal_rate_found()));
        obj.insert("deposit_rate_found".to_string(), json!(self.deposit_rate_found()));
        Value::Object(obj)
    }
}

/// Output dataset: source header order plus enriched rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    pub headers: Vec<String>,
    pub rows: Vec<EnrichedTransaction>,
}

impl EnrichedTable {
    /// Full output header: source columns then derived columns.
    pub fn output_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .cloned()
            .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}

// =============================================================================
// FX rates
// =============================================================================

/// A rate row exactly as read. Extra columns are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFxRate {
    pub run_date: String,
    pub target_currency: String,
    pub rates_base_sgd: String,
}

/// A usable rate: one unit of `target_currency` is `rates_base_sgd` SGD on
/// `run_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxRate {
    pub run_date: NaiveDate,
    pub target_currency: String,
    pub rates_base_sgd: f64,
}
