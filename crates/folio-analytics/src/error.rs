//! # Analytics Errors
//!
//! Error types for the query engine and its configuration.
//!
//! Queries themselves never fail: an unknown year or country yields an
//! empty result. Errors only come from recording purchases (data
//! integrity) and from loading or saving configuration.

use thiserror::Error;

use folio_core::CoreError;

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics error type.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    // =========================================================================
    // Data Integrity Errors
    // =========================================================================
    /// Domain validation or lookup failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A purchase carries a denormalized field that disagrees with the
    /// catalog (e.g. a shop country that is not the shop's country).
    #[error("Purchase reference mismatch: {0}")]
    ReferenceMismatch(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid analytics configuration.
    #[error("Invalid analytics configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl From<std::io::Error> for AnalyticsError {
    fn from(err: std::io::Error) -> Self {
        AnalyticsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for AnalyticsError {
    fn from(err: toml::de::Error) -> Self {
        AnalyticsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AnalyticsError {
    fn from(err: toml::ser::Error) -> Self {
        AnalyticsError::ConfigSaveFailed(err.to_string())
    }
}

impl AnalyticsError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidConfig(_)
                | AnalyticsError::ConfigLoadFailed(_)
                | AnalyticsError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error means rejected purchase data.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Core(_) | AnalyticsError::ReferenceMismatch(_)
        )
    }
}
