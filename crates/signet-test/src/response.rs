//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A response with helpers for assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Wraps a response produced by [`signet::App::handle`].
    pub fn from_response(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the methods listed in the `Allow` header.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&str> {
        self.header_str(header::ALLOW.as_str())
            .map(|v| v.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// The `loc` of every item of a validation error body, in order.
    ///
    /// Empty when the body is not a validation error.
    pub fn validation_locs(&self) -> Vec<Vec<String>> {
        let Ok(Value::Array(items)) = self.json_value() else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| item.get("loc")?.as_array().cloned())
            .map(|loc| {
                loc.iter()
                    .map(|segment| match segment {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(actual, expected, "Header '{name}' mismatch");
        self
    }

    /// Asserts that the JSON body equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or doesn't match.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self.json_value().expect("Body should be valid JSON");
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts that a dotted JSON path (`items.0.name`) equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &Value) -> &Self {
        let path = path.as_ref();
        let json = self.json_value().expect("Body should be valid JSON");
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in: {json}"));
        assert_eq!(actual, expected, "JSON field '{path}' mismatch");
        self
    }

    /// Asserts a 422 whose error items sit at exactly these locations.
    ///
    /// # Panics
    ///
    /// Panics on any other status or location list.
    pub fn assert_validation_locs(&self, expected: &[&[&str]]) -> &Self {
        self.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let expected: Vec<Vec<String>> = expected
            .iter()
            .map(|loc| loc.iter().map(ToString::to_string).collect())
            .collect();
        assert_eq!(self.validation_locs(), expected, "validation error locations");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match (current, segment.parse::<usize>()) {
            (Value::Array(items), Ok(index)) => items.get(index),
            _ => current.get(segment),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_response(status: u16, body: &str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        TestResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn test_status() {
        let response = create_response(404, "{}");
        assert_eq!(response.status_code(), 404);
        assert!(response.is_client_error());
        assert!(!response.is_success());
    }

    #[test]
    fn test_json_field() {
        let response = create_response(200, r#"{"items":[{"name":"a"}]}"#);
        response.assert_json_field("items.0.name", &json!("a"));
        assert_eq!(response.content_type(), Some("application/json"));
    }

    #[test]
    fn test_validation_locs() {
        let body = json!([
            {"loc": ["id"], "type": "type_error.integer", "msg": "value is not a valid integer"},
            {"loc": ["tags", 1], "type": "type_error.str", "msg": "str type expected"}
        ]);
        let response = create_response(422, &body.to_string());
        response.assert_validation_locs(&[&["id"], &["tags", "1"]]);
    }

    #[test]
    fn test_validation_locs_of_other_bodies() {
        let response = create_response(400, r#"{"detail":"bad"}"#);
        assert!(response.validation_locs().is_empty());
    }

    #[test]
    fn test_allowed_methods() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ALLOW, HeaderValue::from_static("GET, POST, OPTIONS"));
        let response = TestResponse::new(StatusCode::NO_CONTENT, headers, Bytes::new());
        assert_eq!(response.allowed_methods(), vec!["GET", "POST", "OPTIONS"]);
    }

    #[test]
    #[should_panic(expected = "Header 'X-Missing' not found")]
    fn test_assert_missing_header() {
        create_response(200, "{}").assert_header("X-Missing", "1");
    }
}
