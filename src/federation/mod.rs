//! Federated search: issuing one query to many content sources at once.
//!
//! This module provides functionality to:
//! - Register heterogeneous content sources behind one trait
//! - Fan a query out to every active source concurrently
//! - Bound the fan-out by a shared deadline and a cancellation token
//! - Keep per-source health statistics

pub mod config;
pub mod context;
pub mod engine;
pub mod source;
pub mod stats;
pub mod task;

pub use config::FederationConfig;
pub use context::SearchContext;
pub use engine::{Federation, SourceFederator};
pub use source::{ContentSource, SourceHandle, SourceParams, SourceRegistry};
pub use stats::{SourceStats, SourceStatsCollector};
pub use task::{SourceOutcome, SourceTask};
