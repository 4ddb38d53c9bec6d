//! Test client for in-memory HTTP testing.

use crate::error::TestError;
use crate::request::{MultipartForm, TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use signet::App;
use std::sync::Arc;

/// Sends requests straight into an [`App`] without a network.
///
/// # Example
///
/// ```
/// use signet::prelude::*;
/// use signet_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let app = AppBuilder::new()
///     .route("/ping", sync_function("ping", |_ctx, _args| Ok("pong")))
///     .build()
///     .unwrap();
///
/// let client = TestClient::new(app);
/// let response = client.get("/ping").send().await;
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(response.text().unwrap(), "pong");
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `app`.
    pub fn new(app: App) -> Self {
        Self::shared(Arc::new(app))
    }

    /// Creates a client for an already shared app.
    pub fn shared(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// The application under test.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates an OPTIONS request builder.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::options(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a built request.
    pub async fn execute(&self, request: TestRequest) -> TestResponse {
        let response = self.app.handle(request.into_http_request()).await;
        TestResponse::from_response(response)
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    fn map(mut self, f: impl FnOnce(TestRequestBuilder) -> TestRequestBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Adds a header; repeat the call to send several values.
    pub fn header(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.map(|b| b.header(name, value))
    }

    /// Adds a cookie.
    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|b| b.cookie(name, value))
    }

    /// Appends a query parameter.
    pub fn query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|b| b.query(name, value))
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.map(|b| b.content_type(content_type))
    }

    /// Sets the raw request body.
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.map(|b| b.body(body))
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Self {
        self.map(|b| b.json(value))
    }

    /// Sets the request body as form-urlencoded.
    pub fn form<T: serde::Serialize>(self, value: &T) -> Self {
        self.map(|b| b.form(value))
    }

    /// Sets a multipart body.
    pub fn multipart(self, form: MultipartForm) -> Self {
        self.map(|b| b.multipart(form))
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built; use
    /// [`try_send`](Self::try_send) to handle that case.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(err) => panic!("failed to build test request: {err}"),
        }
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(self.client.execute(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use signet::prelude::*;

    fn echo_app() -> App {
        let echo = sync_function("echo", |ctx, _args| {
            Ok(json!({
                "method": ctx.method().as_str(),
                "path": ctx.path(),
                "query": ctx.query_string(),
                "custom": ctx.header("x-custom"),
            }))
        });
        AppBuilder::new().route("/echo", echo).build().unwrap()
    }

    #[tokio::test]
    async fn test_echo() {
        let client = TestClient::new(echo_app());
        let response = client.post("/echo").query("q", "1").send().await;

        response
            .assert_status(StatusCode::OK)
            .assert_json_field("method", &json!("POST"))
            .assert_json_field("query", &json!("q=1"));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new(echo_app()).with_default_header("X-Custom", "default-value");
        let response = client.get("/echo").send().await;
        response.assert_json_field("custom", &json!("default-value"));
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(echo_app());
        let result = client.get("/echo").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let client = TestClient::new(echo_app());
        client
            .get("/missing")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_json_field("detail", &json!("Not Found"));
    }
}
