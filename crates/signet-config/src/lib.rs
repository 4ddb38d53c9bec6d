//! Typed configuration for Signet applications.
//!
//! [`SignetConfig`] groups the documentation, extraction and logging
//! settings. [`ConfigLoader`] builds one from defaults, a TOML or JSON
//! file, a `.env` file and prefixed environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SIGNET__DOCS__ENABLED` | `docs.enabled` |
//! | `SIGNET__DOCS__PATH` | `docs.path` |
//! | `SIGNET__DOCS__SERVERS` | `docs.servers` (comma separated) |
//! | `SIGNET__EXTRACTION__HEADER_VALUES` | `extraction.header_values` |
//! | `SIGNET__EXTRACTION__MALFORMED_BODY` | `extraction.malformed_body` |
//! | `SIGNET__EXTRACTION__MAX_BODY_SIZE` | `extraction.max_body_size` |
//! | `SIGNET__LOGGING__LEVEL` | `logging.level` |
//! | `SIGNET__LOGGING__JSON_FORMAT` | `logging.json_format` |

mod config;
mod error;
mod loader;

pub use config::SignetConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
