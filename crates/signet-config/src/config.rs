//! Root configuration type.

use serde::{Deserialize, Serialize};
use signet_docs::DocsConfig;
use signet_extract::ExtractConfig;
use signet_telemetry::LogConfig;

use crate::ConfigError;

/// Complete Signet application configuration.
///
/// Every section falls back to its defaults, so a file only needs the keys
/// it changes.
///
/// ```toml
/// [docs]
/// path = "/api/openapi.json"
/// title = "Inventory"
///
/// [extraction]
/// header_values = "join"
/// malformed_body = "aggregate"
/// max_body_size = 1048576
///
/// [logging]
/// level = "signet_core=debug,info"
/// json_format = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignetConfig {
    /// OpenAPI document settings.
    pub docs: DocsConfig,
    /// Request extraction settings.
    pub extraction: ExtractConfig,
    /// Logging settings.
    pub logging: LogConfig,
}

impl SignetConfig {
    /// Pretty logs at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an enabled docs endpoint
    /// without an absolute path, a zero body or multipart limit, or an
    /// invalid log level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.docs.enabled && !self.docs.path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.path",
                format!("must start with '/', got '{}'", self.docs.path),
            ));
        }
        if self.extraction.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "extraction.max_body_size",
                "must be greater than zero",
            ));
        }
        if self.extraction.max_multipart_fields == 0 {
            return Err(ConfigError::invalid_value(
                "extraction.max_multipart_fields",
                "must be greater than zero",
            ));
        }
        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))
    }
}
