//! Application and endpoint errors.

use bytes::Bytes;
use http::{Response, StatusCode};
use signet_config::ConfigError;
use signet_core::{ArgumentError, DeclarationError};
use signet_docs::DocsError;
use signet_router::RouteError;
use signet_telemetry::TelemetryError;
use thiserror::Error;

use crate::response::{ErrorResponse, IntoResponse};

/// Startup and configuration failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// A handler's bindings are contradictory.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// A route template is invalid or registered twice.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The OpenAPI document could not be generated.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Errors returned by endpoints.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The endpoint read an argument that was not bound as requested.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The endpoint's response could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A deliberate HTTP error.
    #[error("{message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Message sent as `detail`.
        message: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl EndpointError {
    /// A deliberate HTTP error with a client-visible message.
    #[must_use]
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error.
    pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Custom(Box::new(err))
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response<Bytes> {
        match self {
            Self::Status { status, message } => ErrorResponse::new(status, message).into_response(),
            other => {
                tracing::error!(error = %other, "endpoint failed");
                ErrorResponse::internal_error().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error() {
        let err = EndpointError::status(StatusCode::NOT_FOUND, "no such item");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "no such item");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = EndpointError::from(ArgumentError::Missing {
            name: "secret".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.into_response();
        assert!(!String::from_utf8_lossy(response.body()).contains("secret"));
    }

    #[test]
    fn test_app_error_from_declaration() {
        let err: AppError = DeclarationError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Declaration(_)));
    }
}
