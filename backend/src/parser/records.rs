//! Map parsed rows onto transaction and rate records.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{DatasetError, DatasetResult};
use crate::models::{
    RawFxRate, RawTransaction, TransactionTable, DEPOSIT_AMT, DEPOSIT_CURRENCY, RATES_BASE_SGD,
    RATE_COLUMNS, RUN_DATE, TARGET_CURRENCY, TRANSACTION_COLUMNS, VALUE_DATE, WITHDRAWAL_AMT,
    WITHDRAWAL_CURRENCY,
};

use super::ParseResult;

/// Position of every required column, or the first one missing.
fn column_positions(headers: &[String], required: &[&str], path: &Path) -> DatasetResult<HashMap<String, usize>> {
    let mut positions = HashMap::new();
    for column in required {
        let idx = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })?;
        positions.insert(column.to_string(), idx);
    }
    Ok(positions)
}

/// Build a transaction table. Columns other than the five the job uses are
/// carried in `extra`.
pub fn to_transaction_table(parsed: ParseResult, path: &Path) -> DatasetResult<TransactionTable> {
    let positions = column_positions(&parsed.headers, &TRANSACTION_COLUMNS, path)?;
    let field = |row: &[String], column: &str| -> String { row[positions[column]].clone() };

    let rows = parsed
        .rows
        .iter()
        .map(|row| {
            let row = row.as_slice();
            let extra = parsed
                .headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !TRANSACTION_COLUMNS.contains(&header.as_str()))
                .map(|(header, value)| (header.clone(), value.clone()))
                .collect();

            RawTransaction {
                value_date: field(row, VALUE_DATE),
                withdrawal_currency: field(row, WITHDRAWAL_CURRENCY),
                deposit_currency: field(row, DEPOSIT_CURRENCY),
                withdrawal_amt: field(row, WITHDRAWAL_AMT),
                deposit_amt: field(row, DEPOSIT_AMT),
                extra,
            }
        })
        .collect();

    Ok(TransactionTable {
        headers: parsed.headers,
        rows,
    })
}

/// Build raw rate rows. Columns beyond the three rate columns are ignored.
pub fn to_rates(parsed: ParseResult, path: &Path) -> DatasetResult<Vec<RawFxRate>> {
    let positions = column_positions(&parsed.headers, &RATE_COLUMNS, path)?;

    Ok(parsed
        .rows
        .into_iter()
        .map(|row| RawFxRate {
            run_date: row[positions[RUN_DATE]].clone(),
            target_currency: row[positions[TARGET_CURRENCY]].clone(),
            rates_base_sgd: row[positions[RATES_BASE_SGD]].clone(),
        })
        .collect())
}
