//! Rate joins keyed by (value date, currency).
//!
//! Each transaction side is enriched by its own left-outer join against the
//! same [`RateIndex`]:
//!
//! ```text
//! transactions ──join(withdrawal_currency)──▶ + withdrawal_sgd
//!              ──join(deposit_currency)─────▶ + deposit_sgd
//! ```
//!
//! A row whose date or currency is absent has no key and never matches. A
//! row with a key but no rate is kept once with `None`. A key with several
//! rates keeps every match (fan-out); callers that cannot accept fan-out
//! check [`RateIndex::duplicate_keys`] first.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{FxRate, JoinedTransaction, RawFxRate, Transaction, CANONICAL_DATE_FORMAT};
use crate::normalize::cleanse_currency;

/// Join key: effective date and trimmed currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RateKey {
    pub date: NaiveDate,
    pub currency: String,
}

impl std::fmt::Display for RateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.date.format(CANONICAL_DATE_FORMAT), self.currency)
    }
}

/// Parse a raw rate row. `None` when any field is unusable.
pub fn parse_rate(raw: &RawFxRate) -> Option<FxRate> {
    let run_date = NaiveDate::parse_from_str(raw.run_date.trim(), CANONICAL_DATE_FORMAT).ok()?;
    let target_currency = cleanse_currency(&raw.target_currency)?;
    let rates_base_sgd: f64 = raw.rates_base_sgd.trim().parse().ok()?;
    if !rates_base_sgd.is_finite() {
        return None;
    }

    Some(FxRate {
        run_date,
        target_currency,
        rates_base_sgd,
    })
}

/// Rates grouped by [`RateKey`], in dataset order within a key.
#[derive(Debug, Clone, Default)]
pub struct RateIndex {
    by_key: HashMap<RateKey, Vec<f64>>,
    rate_rows: usize,
    unusable_rows: usize,
}

impl RateIndex {
    /// Parse and index raw rows, counting the ones that cannot be used.
    pub fn from_raw(raw: &[RawFxRate]) -> Self {
        let mut index = Self::default();
        for row in raw {
            match parse_rate(row) {
                Some(rate) => index.insert(&rate),
                None => index.unusable_rows += 1,
            }
        }
        index
    }

    fn insert(&mut self, rate: &FxRate) {
        let key = RateKey {
            date: rate.run_date,
            currency: rate.target_currency.clone(),
        };
        self.by_key.entry(key).or_default().push(rate.rates_base_sgd);
        self.rate_rows += 1;
    }

    /// All rates for a key. Empty when either part of the key is absent.
    pub fn lookup(&self, date: Option<NaiveDate>, currency: Option<&str>) -> &[f64] {
        let (Some(date), Some(currency)) = (date, currency) else {
            return &[];
        };
        let key = RateKey {
            date,
            currency: currency.trim().to_string(),
        };
        self.by_key.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys with more than one rate, with their row counts, sorted by key.
    pub fn duplicate_keys(&self) -> Vec<(RateKey, usize)> {
        let mut dups: Vec<(RateKey, usize)> = self
            .by_key
            .iter()
            .filter(|(_, rates)| rates.len() > 1)
            .map(|(key, rates)| (key.clone(), rates.len()))
            .collect();
        dups.sort();
        dups
    }

    /// Number of usable rate rows indexed.
    pub fn rate_rows(&self) -> usize {
        self.rate_rows
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Rows dropped because date, currency or rate could not be parsed.
    pub fn unusable_rows(&self) -> usize {
        self.unusable_rows
    }
}

/// Which currency column a join keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Withdrawal,
    Deposit,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Withdrawal => "withdrawal",
            Side::Deposit => "deposit",
        }
    }

    fn currency<'a>(&self, txn: &'a Transaction) -> Option<&'a str> {
        match self {
            Side::Withdrawal => txn.withdrawal_currency.as_deref(),
            Side::Deposit => txn.deposit_currency.as_deref(),
        }
    }
}

impl AsRef<Transaction> for Transaction {
    fn as_ref(&self) -> &Transaction {
        self
    }
}

impl AsRef<Transaction> for JoinedTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.transaction
    }
}

/// Row accounting for one side's join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideStats {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Rows with at least one rate.
    pub matched: usize,
    /// Rows with a key but no rate.
    pub unmatched: usize,
    /// Rows whose date or currency is absent.
    pub absent_key: usize,
    /// Extra rows produced by duplicate rate keys.
    pub fan_out: usize,
}

/// Output of one side's join.
#[derive(Debug, Clone)]
pub struct SideJoin<T> {
    pub rows: Vec<(T, Option<f64>)>,
    pub stats: SideStats,
}

/// Left-outer join of `rows` to `index` on `side`'s currency.
pub fn join_side<T>(rows: Vec<T>, index: &RateIndex, side: Side) -> SideJoin<T>
where
    T: AsRef<Transaction> + Clone,
{
    let mut stats = SideStats {
        input_rows: rows.len(),
        ..SideStats::default()
    };
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let txn = row.as_ref();
        let currency = side.currency(txn);
        if txn.value_date.is_none() || currency.is_none() {
            stats.absent_key += 1;
            out.push((row, None));
            continue;
        }

        let matches = index.lookup(txn.value_date, currency);
        match matches {
            [] => {
                stats.unmatched += 1;
                out.push((row, None));
            }
            [rate] => {
                stats.matched += 1;
                out.push((row, Some(*rate)));
            }
            many => {
                stats.matched += 1;
                stats.fan_out += many.len() - 1;
                for rate in many {
                    out.push((row.clone(), Some(*rate)));
                }
            }
        }
    }

    stats.output_rows = out.len();
    SideJoin { rows: out, stats }
}

/// Both joins, withdrawal side first, then deposit side.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedTransaction>,
    pub withdrawal: SideStats,
    pub deposit: SideStats,
}

pub fn join_rates(transactions: Vec<Transaction>, index: &RateIndex) -> JoinOutcome {
    let withdrawal = join_side(transactions, index, Side::Withdrawal);
    let staged: Vec<JoinedTransaction> = withdrawal
        .rows
        .into_iter()
        .map(|(transaction, withdrawal_sgd)| JoinedTransaction {
            transaction,
            withdrawal_sgd,
            deposit_sgd: None,
        })
        .collect();

    let deposit = join_side(staged, index, Side::Deposit);
    let rows = deposit
        .rows
        .into_iter()
        .map(|(mut joined, deposit_sgd)| {
            joined.deposit_sgd = deposit_sgd;
            joined
        })
        .collect();

    JoinOutcome {
        rows,
        withdrawal: withdrawal.stats,
        deposit: deposit.stats,
    }
}
