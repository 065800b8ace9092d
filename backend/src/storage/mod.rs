//! Storage boundary of the batch job.
//!
//! The pipeline only ever talks to a [`DatasetStore`]: read the transaction
//! dataset, read the rate dataset, write the enriched dataset. Each call is
//! a scoped operation that reads or writes a dataset in full.
//!
//! - [`LocalStore`] - CSV files and directories on the local filesystem
//! - [`MemoryStore`] - In-memory datasets for injected test data

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::error::StorageResult;
use crate::models::{EnrichedTable, RawFxRate, TransactionTable};

/// Read and write access to the job's three datasets.
pub trait DatasetStore {
    /// Read the whole transaction dataset at `location`.
    fn read_transactions(&self, location: &str) -> StorageResult<TransactionTable>;

    /// Read the whole rate dataset at `location`.
    fn read_rates(&self, location: &str) -> StorageResult<Vec<RawFxRate>>;

    /// Replace whatever is at `location` with `table`. Returns rows written.
    ///
    /// Either the whole table is committed or nothing is.
    fn write_enriched(&self, location: &str, table: &EnrichedTable) -> StorageResult<usize>;
}

/// Serialization of the output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// `.json` locations get JSON, everything else CSV.
    pub fn from_location(location: &str) -> Self {
        if location.to_lowercase().ends_with(".json") {
            OutputFormat::Json
        } else {
            OutputFormat::Csv
        }
    }
}
