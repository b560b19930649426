//! # Analytics Configuration
//!
//! Tuning knobs for the purchase index and report sizes.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FOLIO_CHUNK_CAPACITY=4096                                          │
//! │     FOLIO_PARALLEL_THRESHOLD=0                                         │
//! │     FOLIO_TOP_N=25                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/folio/folio.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.folio.folio/folio.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [index]
//! chunk_capacity = 1024        # slots in a log's first segment
//! parallel_threshold = 50000   # partition size that switches to rayon, 0 = never
//!
//! [reports]
//! top_n = 10                   # rows in the best seller view
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{AnalyticsError, AnalyticsResult};

// =============================================================================
// Index Settings
// =============================================================================

/// Settings of the purchase index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Slots in the first segment of a partition log; each further
    /// segment doubles. Small values waste less memory on sparse
    /// partitions, large values mean fewer allocations on busy ones.
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,

    /// Snapshot size from which ranking, counting and max-by queries
    /// aggregate in parallel. Zero disables parallel aggregation.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_chunk_capacity() -> usize {
    1024
}

fn default_parallel_threshold() -> usize {
    50_000
}

impl Default for IndexSettings {
    fn default() -> Self {
        IndexSettings {
            chunk_capacity: default_chunk_capacity(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl IndexSettings {
    /// Whether a snapshot of `len` purchases should be aggregated in parallel.
    pub fn use_parallel(&self, len: usize) -> bool {
        self.parallel_threshold > 0 && len >= self.parallel_threshold
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Settings of report views built on top of the raw queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Number of entries in the best seller view.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            top_n: default_top_n(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete analytics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub reports: ReportSettings,
}

impl AnalyticsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (folio.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AnalyticsResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading analytics config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load analytics config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AnalyticsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AnalyticsError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Analytics config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.index.chunk_capacity == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "chunk_capacity must be greater than 0".into(),
            ));
        }

        if self.reports.top_n == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "top_n must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(capacity) = env_usize("FOLIO_CHUNK_CAPACITY") {
            debug!(capacity, "Overriding chunk capacity from environment");
            self.index.chunk_capacity = capacity;
        }

        if let Some(threshold) = env_usize("FOLIO_PARALLEL_THRESHOLD") {
            debug!(threshold, "Overriding parallel threshold from environment");
            self.index.parallel_threshold = threshold;
        }

        if let Some(top_n) = env_usize("FOLIO_TOP_N") {
            self.reports.top_n = top_n;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "folio", "folio")
            .map(|dirs| dirs.config_dir().join("folio.toml"))
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse::<usize>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(variable = name, value = %value, "Ignoring non-numeric environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.index.chunk_capacity, 1024);
        assert_eq!(config.index.parallel_threshold, 50_000);
        assert_eq!(config.reports.top_n, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalyticsConfig::default();

        config.index.chunk_capacity = 0;
        assert!(config.validate().is_err());

        config.index.chunk_capacity = 8;
        config.reports.top_n = 0;
        assert!(config.validate().is_err());

        config.reports.top_n = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_use_parallel() {
        let mut settings = IndexSettings::default();
        settings.parallel_threshold = 100;
        assert!(!settings.use_parallel(99));
        assert!(settings.use_parallel(100));

        settings.parallel_threshold = 0;
        assert!(!settings.use_parallel(usize::MAX));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnalyticsConfig = toml::from_str("[reports]\ntop_n = 3\n").unwrap();
        assert_eq!(config.reports.top_n, 3);
        assert_eq!(config.index, IndexSettings::default());
    }

    #[test]
    fn test_toml_serialization() {
        let config = AnalyticsConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[index]"));
        assert!(toml_str.contains("[reports]"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("folio.toml");

        let mut config = AnalyticsConfig::default();
        config.index.chunk_capacity = 64;
        config.reports.top_n = 5;
        config.save(Some(path.clone())).unwrap();

        let loaded = AnalyticsConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.index.chunk_capacity, 64);
        assert_eq!(loaded.reports.top_n, 5);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[index]\nchunk_capacity = 0\n").unwrap();

        let err = AnalyticsConfig::load(Some(path.clone())).unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(AnalyticsConfig::load_or_default(Some(path)), AnalyticsConfig::default());
    }
}
