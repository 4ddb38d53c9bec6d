//! Response builders.
//!
//! Endpoints return anything implementing [`IntoResponse`]. Signet's own
//! error responses (404, 405, 400, 413, 422) are built here too.

use bytes::Bytes;
use http::{header, HeaderValue, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use signet_core::ValidationError;
use signet_extract::ExtractionError;

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Conversion into an HTTP response.
pub trait IntoResponse {
    /// Builds the response.
    fn into_response(self) -> Response<Bytes>;
}

fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Bytes> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn empty(status: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status;
    response
}

/// Serializes `body` as JSON. A serialization failure yields a bare 500.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Bytes> {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_body(status, APPLICATION_JSON, bytes),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response body");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// JSON response builder.
///
/// # Example
///
/// ```rust
/// use signet::response::{IntoResponse, JsonResponse};
/// use serde_json::json;
///
/// let response = JsonResponse::created(json!({"id": 1})).into_response();
/// assert_eq!(response.status(), http::StatusCode::CREATED);
/// ```
#[derive(Debug)]
pub struct JsonResponse<T> {
    data: T,
    status: StatusCode,
}

impl<T: Serialize> JsonResponse<T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Creates a JSON response with status 201 Created.
    #[must_use]
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response<Bytes> {
        json_response(self.status, &self.data)
    }
}

/// JSON error envelope `{"detail": ..}` with optional extras.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    status: StatusCode,
    detail: String,
    code: Option<&'static str>,
    allowed: Vec<Method>,
}

impl ErrorResponse {
    /// Creates a new error response.
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            code: None,
            allowed: Vec::new(),
        }
    }

    /// 404 for an unrouted path.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    /// 405 listing the allowed methods, also sent as the `Allow` header.
    #[must_use]
    pub fn method_not_allowed(allowed: Vec<Method>) -> Self {
        Self {
            allowed,
            ..Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
        }
    }

    /// 500 without internal details.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// Adds a machine-readable error code.
    #[must_use]
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response<Bytes> {
        let mut body = json!({ "detail": self.detail });
        if let Some(code) = self.code {
            body["code"] = json!(code);
        }
        if !self.allowed.is_empty() {
            let allowed: Vec<&str> = self.allowed.iter().map(Method::as_str).collect();
            body["allowed"] = json!(allowed);
        }

        let mut response = json_response(self.status, &body);
        if let Some(allow) = allow_header(&self.allowed) {
            response.headers_mut().insert(header::ALLOW, allow);
        }
        response
    }
}

/// Joins methods into an `Allow` header value.
pub(crate) fn allow_header(methods: &[Method]) -> Option<HeaderValue> {
    if methods.is_empty() {
        return None;
    }
    let joined = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&joined).ok()
}

/// Automatic `OPTIONS` answer.
pub(crate) fn options_response(allowed: &[Method]) -> Response<Bytes> {
    let mut response = empty(StatusCode::NO_CONTENT);
    if let Some(allow) = allow_header(allowed) {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response<Bytes> {
        json_response(self.status_code(), &self.to_value())
    }
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response<Bytes> {
        ErrorResponse::new(self.status_code(), self.message())
            .with_code(self.error_code())
            .into_response()
    }
}

impl IntoResponse for Response<Bytes> {
    fn into_response(self) -> Response<Bytes> {
        self
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> Response<Bytes> {
        json_response(StatusCode::OK, &self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response<Bytes> {
        with_body(StatusCode::OK, TEXT_PLAIN, self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response<Bytes> {
        with_body(StatusCode::OK, TEXT_PLAIN, self)
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response<Bytes> {
        empty(self)
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response<Bytes> {
        empty(StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::ErrorItem;

    fn body_json(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_json_response() {
        let response = JsonResponse::new(json!({"id": 7})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_json(&response), json!({"id": 7}));
    }

    #[test]
    fn test_method_not_allowed() {
        let response =
            ErrorResponse::method_not_allowed(vec![Method::GET, Method::OPTIONS]).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, OPTIONS");
        assert_eq!(
            body_json(&response),
            json!({"detail": "Method Not Allowed", "allowed": ["GET", "OPTIONS"]})
        );
    }

    #[test]
    fn test_validation_error_response() {
        let err = ValidationError::new(vec![ErrorItem {
            loc: vec!["id".to_string()],
            kind: "type_error.integer".to_string(),
            msg: "value is not a valid integer".to_string(),
        }]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(&response),
            json!([{"loc": ["id"], "type": "type_error.integer", "msg": "value is not a valid integer"}])
        );
    }

    #[test]
    fn test_extraction_error_response() {
        let response = ExtractionError::payload_too_large(1, 2).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(&response)["code"], json!("PAYLOAD_TOO_LARGE"));
    }

    #[test]
    fn test_plain_conversions() {
        assert_eq!(().into_response().status(), StatusCode::NO_CONTENT);
        assert_eq!(StatusCode::ACCEPTED.into_response().status(), StatusCode::ACCEPTED);
        assert_eq!("ok".into_response().body().as_ref(), b"ok");
        assert!(options_response(&[]).headers().get(header::ALLOW).is_none());
    }
}
