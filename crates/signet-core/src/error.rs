//! Error types for declaration, validation and argument access.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::location::Location;

/// A programmer error in a handler's binding declaration.
///
/// Raised while building markers or analyzing handlers at startup, never
/// while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// `exclusive` combined with another marker attribute.
    #[error(
        "The `exclusive=true` parameter of `{marker}` cannot be used with other parameters at the same time.",
        marker = .location.marker_name()
    )]
    ExclusiveWithAttributes {
        /// Location of the offending marker.
        location: Location,
    },

    /// Exclusive marker on a parameter not annotated with a composite type.
    #[error("The `{param}` parameter of `{handler}` must use type annotations and the type annotations must be a composite schema type.")]
    ExclusiveAnnotation {
        /// Handler name.
        handler: String,
        /// Parameter name.
        param: String,
    },

    /// Exclusive marker sharing a location with other markers.
    #[error(
        "You used exclusive parameter: `{marker}(exclusive=true)`, please ensure the `{marker}` field is unique in `{handler}`.",
        marker = .location.marker_name()
    )]
    ExclusiveConflict {
        /// Handler name.
        handler: String,
        /// The contested location.
        location: Location,
    },

    /// A `pattern` constraint that does not compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    /// Path to the failing field, e.g. `["page-size"]` or `["tags", "1"]`.
    pub loc: Vec<String>,
    /// Machine-readable kind, e.g. `type_error.integer`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message.
    pub msg: String,
}

impl ErrorItem {
    /// Creates an error item.
    pub fn new(loc: Vec<String>, kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            loc,
            kind: kind.into(),
            msg: msg.into(),
        }
    }
}

/// Every validation failure of one request.
///
/// Rendered as a 422 response body of the shape
/// `[{"loc": [...], "type": "...", "msg": "..."}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<ErrorItem>,
}

impl ValidationError {
    /// Wraps collected failures.
    pub fn new(errors: Vec<ErrorItem>) -> Self {
        Self { errors }
    }

    /// The failures in the order they were found.
    pub fn errors(&self) -> &[ErrorItem] {
        &self.errors
    }

    /// Consumes the error, returning the failures.
    pub fn into_errors(self) -> Vec<ErrorItem> {
        self.errors
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true when there are no failures.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    /// Pretty-printed JSON body.
    pub fn json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }

    /// JSON value of the body.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.errors
                .iter()
                .map(|e| json!({"loc": e.loc, "type": e.kind, "msg": e.msg}))
                .collect(),
        )
    }

    /// JSON schema describing the response body.
    pub fn schema() -> Value {
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "loc": {
                        "title": "Loc",
                        "description": "error field",
                        "type": "array",
                        "items": {"type": "string"}
                    },
                    "type": {
                        "title": "Type",
                        "description": "error type",
                        "type": "string"
                    },
                    "msg": {
                        "title": "Msg",
                        "description": "error message",
                        "type": "string"
                    }
                },
                "required": ["loc", "type", "msg"]
            }
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors.len();
        write!(
            f,
            "{count} validation error{} for request",
            if count == 1 { "" } else { "s" }
        )?;
        for item in &self.errors {
            write!(f, "\n{}\n  {} (type={})", item.loc.join(" -> "), item.msg, item.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors reading a bound argument back out of [`BoundArgs`](crate::BoundArgs).
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// Nothing was bound under the name.
    #[error("argument `{name}` was not bound")]
    Missing {
        /// Argument name.
        name: String,
    },

    /// The argument is a file; use `BoundArgs::file`.
    #[error("argument `{name}` is an uploaded file")]
    File {
        /// Argument name.
        name: String,
    },

    /// The argument does not deserialize into the requested type.
    #[error("argument `{name}` has an unexpected shape: {source}")]
    Deserialize {
        /// Argument name.
        name: String,
        /// Deserializer error.
        #[source]
        source: serde_json::Error,
    },
}
