//! # fxenrich - FX rate enrichment for bank transaction batches
//!
//! Reads a batch of bank statement lines and a dataset of daily FX rates,
//! attaches the SGD rate for each transaction side and writes the batch back
//! with converted amounts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Transactions │──▶│  Normalize   │──▶│  Rate joins  │──▶│   Convert    │──▶ output
//! │  (dd-Mon-yy) │   │ date, ccy    │   │ wdl, dep     │   │  rate * amt  │
//! └──────────────┘   └──────────────┘   └──────▲───────┘   └──────────────┘
//!                                              │
//!                                        ┌─────┴──────┐
//!                                        │  FX rates  │
//!                                        └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Transaction and rate records for each stage
//! - [`normalize`] - Date and currency key normalization
//! - [`transform`] - Joins, conversion and the batch driver
//! - [`parser`] - Delimited-file reading with auto-detection
//! - [`storage`] - Dataset store trait, local and in-memory stores
//! - [`config`] - Environment and flag configuration
//! - [`logs`] - Run log broadcaster

// Core modules
pub mod error;
pub mod models;

// Stages
pub mod normalize;
pub mod transform;

// I/O
pub mod parser;
pub mod storage;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConfigError, DatasetError, PipelineError, PipelineResult, StorageError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    EnrichedTable, EnrichedTransaction, FxRate, JoinedTransaction, RawFxRate, RawTransaction,
    Transaction, TransactionTable,
};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use normalize::{cleanse_currency, format_value_date, normalize_transaction, normalize_value_date, CENTURY_PIVOT};

pub use transform::{
    convert, enrich, join_rates, join_side, preview_batch, run_batch, EnrichOutcome, EnrichStats,
    JobContext, RateIndex, RateKey, RunReport, Side, SideStats,
};

// =============================================================================
// Re-exports - Storage & config
// =============================================================================

pub use storage::{DatasetStore, LocalStore, MemoryStore, OutputFormat};

pub use config::{ConfigOverrides, DuplicatePolicy, JobConfig};
