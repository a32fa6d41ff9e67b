//! Top-level engine configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analytics::config::AnalyticsConfig;
use crate::cache::config::CacheConfig;
use crate::error::{FedSearchError, Result};
use crate::federation::config::FederationConfig;
use crate::search::SearchConfig;

/// Configuration for [`crate::orchestrator::SearchOrchestrator`].
///
/// Every section may be omitted from a JSON file, in which case its defaults
/// apply. Durations are written in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Query validation and pagination limits.
    pub search: SearchConfig,

    /// Source fan-out settings.
    pub federation: FederationConfig,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Analytics settings.
    pub analytics: AnalyticsConfig,
}

impl EngineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        log::debug!("loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Reject settings that would make every search fail or return nothing.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_limit == 0 {
            return Err(FedSearchError::config("search.max_limit must be positive"));
        }
        if self.search.default_limit == 0 {
            return Err(FedSearchError::config("search.default_limit must be positive"));
        }
        if self.federation.default_timeout.is_zero() {
            return Err(FedSearchError::config(
                "federation.default_timeout must be positive",
            ));
        }
        if self.cache.enabled && self.cache.ttl.is_zero() {
            return Err(FedSearchError::config("cache.ttl must be positive"));
        }
        Ok(())
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_federation(mut self, federation: FederationConfig) -> Self {
        self.federation = federation;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = analytics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_from_json_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"federation": {{"default_timeout": 1500}}, "cache": {{"enabled": false}}}}"#
        )
        .unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.federation.default_timeout, Duration::from_millis(1500));
        assert!(!config.cache.enabled);
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(config.analytics.history_capacity, 100);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"search": {{"max_limit": 0}}}}"#).unwrap();

        let err = EngineConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, FedSearchError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/nonexistent/fedsearch.json").unwrap_err();
        assert!(matches!(err, FedSearchError::Io(_)));
    }
}
