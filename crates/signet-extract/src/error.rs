//! Extraction error types.

use std::fmt;

use http::StatusCode;
use signet_core::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Data could not be decoded at all
    Malformed,
    /// Body exceeds the configured limit
    PayloadTooLarge,
    /// Content-Type is unusable for the payload
    InvalidContentType,
}

/// A request whose raw data could not be interpreted.
///
/// Unlike a [`ValidationError`](signet_core::ValidationError), this means
/// the request never reached schema validation.
///
/// # Example
///
/// ```rust
/// use signet_extract::ExtractionError;
/// use signet_core::Location;
/// use http::StatusCode;
///
/// let err = ExtractionError::malformed(Location::Body, "Unable to parse JSON data");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.location(), Location::Body);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    location: Location,
    kind: ExtractionErrorKind,
    message: String,
}

impl ExtractionError {
    /// Data at `location` could not be decoded.
    #[must_use]
    pub fn malformed(location: Location, details: impl Into<String>) -> Self {
        Self {
            location,
            kind: ExtractionErrorKind::Malformed,
            message: details.into(),
        }
    }

    /// The body is larger than allowed.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            location: Location::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
        }
    }

    /// The Content-Type header cannot be used.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self {
            location: Location::Body,
            kind: ExtractionErrorKind::InvalidContentType,
            message: details.into(),
        }
    }

    /// Location being extracted.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true for undecodable data, the only kind that may be folded
    /// into a validation error.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            ExtractionErrorKind::Malformed | ExtractionErrorKind::InvalidContentType
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed | ExtractionErrorKind::InvalidContentType => {
                StatusCode::BAD_REQUEST
            }
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Error code for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Malformed => "MALFORMED_PAYLOAD",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::InvalidContentType => "INVALID_CONTENT_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExtractionError {}
