//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to convert between the document model and JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A route template could not be expressed as an OpenAPI path.
    #[error("Invalid route template '{template}': {reason}")]
    InvalidTemplate {
        /// The offending template.
        template: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
