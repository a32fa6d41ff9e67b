//! Configuration for the result cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::cache::ResultCache`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether responses are cached at all.
    pub enabled: bool,

    /// How long an entry stays valid.
    #[serde(with = "crate::util::serde_millis")]
    pub ttl: Duration,

    /// How often the background sweeper removes expired entries.
    #[serde(with = "crate::util::serde_millis")]
    pub sweep_interval: Duration,

    /// Upper bound on the number of entries. When full, the oldest entry is
    /// evicted to make room.
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(10 * 60),
            max_entries: Some(1000),
        }
    }
}

impl CacheConfig {
    /// A configuration that caches nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }
}
