//! Logging setup for Signet services.
//!
//! Signet's crates log through `tracing`. This crate configures the
//! `tracing-subscriber` stack: an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! built from [`LogConfig::level`] and a JSON or pretty `fmt` layer.

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
