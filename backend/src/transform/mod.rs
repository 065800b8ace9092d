//! Enrichment stages.
//!
//! - Join: Left-outer rate joins per transaction side
//! - Convert: SGD amounts from joined rates
//! - Pipeline: Batch driver over a storage context

pub mod convert;
pub mod join;
pub mod pipeline;

pub use convert::{convert, convert_amount, parse_amount};
pub use join::{join_rates, join_side, parse_rate, JoinOutcome, RateIndex, RateKey, Side, SideJoin, SideStats};
pub use pipeline::{enrich, preview_batch, run_batch, EnrichOutcome, EnrichStats, JobContext, RunReport};
