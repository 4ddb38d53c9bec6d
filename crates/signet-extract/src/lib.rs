//! # Signet Extract
//!
//! Turns an HTTP request into per-location raw data for Signet's binder.
//!
//! | Location | Source | Shape |
//! |----------|--------|-------|
//! | path | route parameters | text values |
//! | query | URL query string | text, repeated names become lists |
//! | header | request headers | lowercase names, see [`HeaderValues`] |
//! | cookie | `Cookie` headers | text values |
//! | body | JSON, form or multipart payload | see [`BodyFormat`] |
//!
//! Extraction never validates. It only decodes; type coercion and
//! constraint checks happen when the bundle binds the raw data.
//!
//! ## Example
//!
//! ```rust
//! use signet_extract::{parse_query, parse_cookies};
//! use signet_core::RawValue;
//! use http::HeaderMap;
//!
//! let query = parse_query(Some("tag=a&tag=b")).unwrap();
//! assert!(matches!(query["tag"], RawValue::Many(_)));
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("cookie", "session=abc".parse().unwrap());
//! assert_eq!(parse_cookies(&headers)["session"], RawValue::text("abc"));
//! ```

mod body;
mod config;
mod context;
mod error;
mod extractor;
mod header;
mod multi;
mod query;

pub use body::{parse_body, parse_form, parse_json, parse_multipart, BodyFormat};
pub use config::{
    ExtractConfig, HeaderValues, MalformedBody, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_MAX_MULTIPART_FIELDS,
};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::ExtractionError;
pub use extractor::RequestExtractor;
pub use header::{parse_cookies, parse_headers};
pub use multi::collapse;
pub use query::parse_query;
