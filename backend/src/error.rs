//! Error types for the FX enrichment batch job.
//!
//! One error type per layer:
//!
//! - [`DatasetError`] - Reading and decoding input datasets
//! - [`StorageError`] - Storage locations and output writes
//! - [`ConfigError`] - Job configuration
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Per-row anomalies (bad dates, blank currencies, missing rates) are not
//! errors: they surface as absent or zero values in the output. Only the
//! variants below abort a run.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors while reading a dataset into records.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode the file contents.
    #[error("Failed to decode '{path}': {message}")]
    Encoding { path: PathBuf, message: String },

    /// Invalid CSV content.
    #[error("Invalid CSV in '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// File has no header line.
    #[error("Dataset file '{0}' is empty")]
    EmptyFile(PathBuf),

    /// A column the job needs is not in the header.
    #[error("Missing column '{column}' in '{path}'")]
    MissingColumn { column: String, path: PathBuf },

    /// Partition files of one dataset disagree on their columns.
    #[error("Header of '{path}' does not match the first file of the dataset")]
    HeaderMismatch { path: PathBuf },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors at the storage boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Location does not exist or holds no data files.
    #[error("No dataset found at '{0}'")]
    NotFound(String),

    /// A dataset directory could not be walked.
    #[error("Failed to list '{location}': {source}")]
    Walk {
        location: String,
        #[source]
        source: walkdir::Error,
    },

    /// Dataset could not be read.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Output could not be written.
    #[error("Failed to write '{location}': {message}")]
    Write { location: String, message: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while assembling the job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required location was given neither as flag nor env var.
    #[error("Missing {what}: pass --{flag} or set {env}")]
    MissingLocation {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    /// Unknown duplicate-rate policy.
    #[error("Invalid duplicate rate policy '{0}' (expected 'reject' or 'fan-out')")]
    InvalidDuplicatePolicy(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::transform::pipeline::run_batch`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The rate dataset repeats (date, currency) keys and the policy rejects it.
    #[error("Rate dataset has {count} duplicated (run_date, target_currency) keys, e.g. {sample}")]
    DuplicateRates { count: usize, sample: String },
}

impl From<DatasetError> for PipelineError {
    fn from(err: DatasetError) -> Self {
        PipelineError::Storage(StorageError::Dataset(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
