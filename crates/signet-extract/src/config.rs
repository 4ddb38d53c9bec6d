//! Extraction settings.

use serde::{Deserialize, Serialize};

/// Default body limit: 2 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Default upper bound on multipart fields.
pub const DEFAULT_MAX_MULTIPART_FIELDS: usize = 100;

/// How repeated header values are presented to validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderValues {
    /// A single value stays scalar, repeated values become a list.
    #[default]
    Collapse,
    /// Repeated values are joined with `", "` into one string.
    Join,
}

/// What happens to a body that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedBody {
    /// Fail the request with 400 before validation.
    #[default]
    Reject,
    /// Report it as a body validation error alongside the others.
    Aggregate,
}

/// Request extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Repeated header policy.
    pub header_values: HeaderValues,
    /// Malformed body policy.
    pub malformed_body: MalformedBody,
    /// Largest accepted body in bytes.
    pub max_body_size: usize,
    /// Largest accepted number of multipart fields.
    pub max_multipart_fields: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_values: HeaderValues::default(),
            malformed_body: MalformedBody::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_multipart_fields: DEFAULT_MAX_MULTIPART_FIELDS,
        }
    }
}

impl ExtractConfig {
    /// Sets the header policy.
    #[must_use]
    pub fn with_header_values(mut self, mode: HeaderValues) -> Self {
        self.header_values = mode;
        self
    }

    /// Sets the malformed body policy.
    #[must_use]
    pub fn with_malformed_body(mut self, policy: MalformedBody) -> Self {
        self.malformed_body = policy;
        self
    }

    /// Sets the body limit.
    #[must_use]
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}
