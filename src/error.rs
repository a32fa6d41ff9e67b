//! Error types for the fedsearch library.
//!
//! All fallible operations return [`FedSearchError`] through the crate-wide
//! [`Result`] alias. Only a handful of variants ever reach a caller of
//! [`crate::orchestrator::SearchOrchestrator::search`]: a single failing
//! source is reported as a degraded source on a successful response, and
//! only total source unavailability fails the call.
//!
//! # Examples
//!
//! ```
//! use fedsearch::error::{FedSearchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(FedSearchError::invalid_argument("limit must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for fedsearch operations.
#[derive(Error, Debug)]
pub enum FedSearchError {
    /// Every registered source failed or timed out.
    #[error("All {attempted} content sources are unavailable: {}", .failures.join("; "))]
    SourcesUnavailable {
        /// Number of sources the query was issued to.
        attempted: usize,
        /// One diagnostic line per failed source.
        failures: Vec<String>,
    },

    /// A single source failed.
    #[error("Source '{source_id}' failed: {message}")]
    Source { source_id: String, message: String },

    /// An operation exceeded its time budget.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (fixture files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error, mostly raised by source implementations.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with FedSearchError.
pub type Result<T> = std::result::Result<T, FedSearchError>;

impl FedSearchError {
    /// Create a new source failure.
    pub fn source_failure<S: Into<String>, M: Into<String>>(source_id: S, msg: M) -> Self {
        FedSearchError::Source {
            source_id: source_id.into(),
            message: msg.into(),
        }
    }

    /// Create a new sources-unavailable error.
    pub fn sources_unavailable(attempted: usize, failures: Vec<String>) -> Self {
        FedSearchError::SourcesUnavailable {
            attempted,
            failures,
        }
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        FedSearchError::Timeout(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        FedSearchError::Cancelled(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FedSearchError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        FedSearchError::Config(msg.into())
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FedSearchError::SourcesUnavailable { .. } | FedSearchError::Timeout(_)
        )
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            FedSearchError::SourcesUnavailable { .. } | FedSearchError::Timeout(_) => {
                "Search is temporarily unavailable, please try again.".to_string()
            }
            FedSearchError::Cancelled(_) => "Search was cancelled.".to_string(),
            other => other.to_string(),
        }
    }
}
