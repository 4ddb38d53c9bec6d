//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use signet_extract::{HeaderValues, MalformedBody};

use crate::{ConfigError, SignetConfig};

/// Configuration loader.
///
/// Layers apply in order, later ones overriding earlier ones:
/// 1. Default values
/// 2. A TOML or JSON file (or string)
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use signet_config::ConfigLoader;
///
/// # fn main() -> Result<(), signet_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("signet.toml")?
///     .with_dotenv()
///     .with_env_prefix("SIGNET")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: SignetConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use signet_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SignetConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SignetConfig::production();
        self
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read,
    /// has another extension, or does not parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        self.config = parse(&content, format)?;

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` ("toml" or "json").
    ///
    /// ```
    /// use signet_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[docs]\npath = \"/spec.json\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.docs.path, "/spec.json");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides, e.g. `SIGNET`
    /// for `SIGNET__EXTRACTION__MAX_BODY_SIZE`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<SignetConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SignetConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let docs = &mut self.config.docs;
        let extraction = &mut self.config.extraction;
        let logging = &mut self.config.logging;

        match parts.as_slice() {
            ["DOCS", "ENABLED"] => docs.enabled = bool_var(key, value)?,
            ["DOCS", "PATH"] => docs.path = value.to_string(),
            ["DOCS", "TITLE"] => docs.title = value.to_string(),
            ["DOCS", "VERSION"] => docs.version = value.to_string(),
            ["DOCS", "DESCRIPTION"] => {
                docs.description = (!value.is_empty()).then(|| value.to_string());
            }
            ["DOCS", "SERVERS"] => {
                docs.servers = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned)
                    .collect();
            }

            ["EXTRACTION", "HEADER_VALUES"] => {
                extraction.header_values = match value.to_lowercase().as_str() {
                    "collapse" => HeaderValues::Collapse,
                    "join" => HeaderValues::Join,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'collapse' or 'join'")),
                };
            }
            ["EXTRACTION", "MALFORMED_BODY"] => {
                extraction.malformed_body = match value.to_lowercase().as_str() {
                    "reject" => MalformedBody::Reject,
                    "aggregate" => MalformedBody::Aggregate,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'reject' or 'aggregate'",
                        ))
                    }
                };
            }
            ["EXTRACTION", "MAX_BODY_SIZE"] => extraction.max_body_size = usize_var(key, value)?,
            ["EXTRACTION", "MAX_MULTIPART_FIELDS"] => {
                extraction.max_multipart_fields = usize_var(key, value)?;
            }

            ["LOGGING", "ENABLED"] => logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "JSON_FORMAT"] => logging.json_format = bool_var(key, value)?,
            ["LOGGING", "SPAN_EVENTS"] => logging.span_events = bool_var(key, value)?,
            ["LOGGING", "FILE_LINE_INFO"] => logging.file_line_info = bool_var(key, value)?,
            ["LOGGING", "THREAD_IDS"] => logging.thread_ids = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_TARGET"] => logging.include_target = bool_var(key, value)?,

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<SignetConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn usize_var(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, SignetConfig::default());
    }

    #[test]
    fn test_loader_with_string_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"extraction": {"malformed_body": "aggregate"}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.extraction.malformed_body, MalformedBody::Aggregate);
        assert_eq!(config.docs.path, "/openapi.json");
    }

    #[test]
    fn test_loader_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(f)) if f == "yaml"));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/signet.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/signet.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, SignetConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[extraction]\nmax_body_size = 0", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    // Overrides are applied directly: mutating the process environment
    // needs `unsafe` on newer editions and the workspace forbids it.

    #[test]
    fn test_apply_env_var_docs() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__DOCS__PATH", "/spec.json", "T").unwrap();
        loader
            .apply_env_var("T__DOCS__SERVERS", "https://a.example, https://b.example", "T")
            .unwrap();
        loader.apply_env_var("T__DOCS__ENABLED", "no", "T").unwrap();
        assert_eq!(loader.config.docs.path, "/spec.json");
        assert_eq!(loader.config.docs.servers.len(), 2);
        assert!(!loader.config.docs.enabled);
    }

    #[test]
    fn test_apply_env_var_extraction() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__EXTRACTION__HEADER_VALUES", "join", "T").unwrap();
        loader.apply_env_var("T__EXTRACTION__MAX_BODY_SIZE", "1024", "T").unwrap();
        assert_eq!(loader.config.extraction.header_values, HeaderValues::Join);
        assert_eq!(loader.config.extraction.max_body_size, 1024);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("T__EXTRACTION__MAX_BODY_SIZE", "lots", "T")
            .is_err());
        assert!(loader
            .apply_env_var("T__EXTRACTION__MALFORMED_BODY", "ignore", "T")
            .is_err());
        assert!(loader.apply_env_var("T__LOGGING__ENABLED", "maybe", "T").is_err());
    }

    #[test]
    fn test_apply_env_var_logging_and_unknown_key() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__LOGGING__LEVEL", "debug", "T").unwrap();
        loader.apply_env_var("T__LOGGING__JSON_FORMAT", "false", "T").unwrap();
        loader.apply_env_var("T__UNKNOWN__KEY", "x", "T").unwrap();
        assert_eq!(loader.config.logging.level, "debug");
        assert!(!loader.config.logging.json_format);
    }
}
