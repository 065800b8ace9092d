//! Local filesystem store.
//!
//! A dataset location is either a single file or a directory. Directories
//! are walked recursively and every `*.csv` file in them is read, in path
//! order, as one logical dataset (e.g. rates partitioned as
//! `rates/2023-01-05/part-0.csv`). Files starting with `.` or `_` are
//! skipped, symlinks are followed, and empty part files are skipped with a
//! warning. A dataset whose files are all empty is an error.
//!
//! The output is a single file, written to a temporary sibling first and
//! renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DatasetError, StorageError, StorageResult};
use crate::logs::{log_info_indent, log_warning};
use crate::models::{EnrichedTable, RawFxRate, TransactionTable};
use crate::parser::{parse_file_auto, to_rates, to_transaction_table, ParseResult};

use super::{DatasetStore, OutputFormat};

/// [`DatasetStore`] over local CSV files.
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    /// Data files making up the dataset at `location`, sorted by path.
    pub fn data_files(location: &str) -> StorageResult<Vec<PathBuf>> {
        let path = Path::new(location);
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        if !path.is_dir() {
            return Err(StorageError::NotFound(location.to_string()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|source| StorageError::Walk {
                location: location.to_string(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }
            if entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            {
                files.push(entry.into_path());
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(StorageError::NotFound(location.to_string()));
        }
        Ok(files)
    }

    /// Parse every file of the dataset at `location`.
    ///
    /// Inside a directory an empty part file is skipped, unless every file is.
    fn read_parts(location: &str) -> StorageResult<Vec<(PathBuf, ParseResult)>> {
        let directory = Path::new(location).is_dir();
        let mut parts = Vec::new();
        let mut empty = Vec::new();

        for path in Self::data_files(location)? {
            match Self::parse_logged(&path) {
                Ok(parsed) => parts.push((path, parsed)),
                Err(StorageError::Dataset(DatasetError::EmptyFile(_))) if directory => {
                    log_warning(format!("Skipping empty part file {}", path.display()));
                    empty.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        if parts.is_empty() {
            if let Some(first) = empty.into_iter().next() {
                return Err(DatasetError::EmptyFile(first).into());
            }
        }
        Ok(parts)
    }

    fn parse_logged(path: &Path) -> StorageResult<ParseResult> {
        let parsed = parse_file_auto(path)?;
        log_info_indent(
            format!(
                "{}: {} rows ({}, '{}')",
                path.display(),
                parsed.rows.len(),
                parsed.encoding,
                format_delimiter(parsed.delimiter)
            ),
            1,
        );
        Ok(parsed)
    }

    fn serialize(location: &str, table: &EnrichedTable) -> StorageResult<Vec<u8>> {
        match OutputFormat::from_location(location) {
            OutputFormat::Json => {
                let records: Vec<serde_json::Value> =
                    table.rows.iter().map(|row| row.to_json(&table.headers)).collect();
                Ok(serde_json::to_vec_pretty(&records)?)
            }
            OutputFormat::Csv => {
                let write_err = |e: csv::Error| StorageError::Write {
                    location: location.to_string(),
                    message: e.to_string(),
                };
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(table.output_headers()).map_err(write_err)?;
                for row in &table.rows {
                    writer.write_record(row.to_csv_row(&table.headers)).map_err(write_err)?;
                }
                writer.into_inner().map_err(|e| StorageError::Write {
                    location: location.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl DatasetStore for LocalStore {
    fn read_transactions(&self, location: &str) -> StorageResult<TransactionTable> {
        let mut parts = Vec::new();
        for (path, parsed) in Self::read_parts(location)? {
            let part = to_transaction_table(parsed, &path)?;
            parts.push((path, part));
        }

        let mut parts = parts.into_iter();
        let (_, mut table) = parts
            .next()
            .ok_or_else(|| StorageError::NotFound(location.to_string()))?;

        for (path, part) in parts {
            if part.headers != table.headers {
                return Err(DatasetError::HeaderMismatch { path }.into());
            }
            table.rows.extend(part.rows);
        }

        Ok(table)
    }

    fn read_rates(&self, location: &str) -> StorageResult<Vec<RawFxRate>> {
        let mut rates = Vec::new();
        for (path, parsed) in Self::read_parts(location)? {
            rates.extend(to_rates(parsed, &path)?);
        }
        Ok(rates)
    }

    fn write_enriched(&self, location: &str, table: &EnrichedTable) -> StorageResult<usize> {
        let target = Path::new(location);
        let write_err = |e: std::io::Error| StorageError::Write {
            location: location.to_string(),
            message: e.to_string(),
        };

        if target.is_dir() {
            return Err(StorageError::Write {
                location: location.to_string(),
                message: "location is a directory".to_string(),
            });
        }

        let bytes = Self::serialize(location, table)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::Write {
                location: location.to_string(),
                message: "location has no file name".to_string(),
            })?;
        let tmp = target.with_file_name(format!(".{}.tmp", file_name));

        if let Err(e) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, target)) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        Ok(table.rows.len())
    }
}

fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
