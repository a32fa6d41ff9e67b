//! Configuration for federated search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the source federator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationConfig {
    /// Deadline applied when the caller does not supply one.
    #[serde(with = "crate::util::serde_millis")]
    pub default_timeout: Duration,

    /// Budget for each individual source, within the shared deadline.
    #[serde(with = "crate::util::serde_millis::option")]
    pub per_source_timeout: Option<Duration>,

    /// Maximum number of items kept from each source.
    pub max_results_per_source: usize,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(3),
            per_source_timeout: None,
            max_results_per_source: 1000,
        }
    }
}

impl FederationConfig {
    /// Set the default deadline.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the per-source budget.
    pub fn with_per_source_timeout(mut self, timeout: Duration) -> Self {
        self.per_source_timeout = Some(timeout);
        self
    }

    /// Set the per-source result cap.
    pub fn with_max_results_per_source(mut self, max: usize) -> Self {
        self.max_results_per_source = max;
        self
    }
}
