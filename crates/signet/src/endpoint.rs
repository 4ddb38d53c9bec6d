//! Endpoint closures.
//!
//! An [`Endpoint`] is the callable stored in a [`Function`]. It receives the
//! request's [`ExtractionContext`] and the [`BoundArgs`] produced by the
//! binder, and returns anything implementing [`IntoResponse`].
//!
//! # Example
//!
//! ```rust
//! use signet::endpoint::function;
//! use signet::prelude::*;
//!
//! let get_item = function("get_item", |_ctx, args: BoundArgs| async move {
//!     let id: i64 = args.get("id")?;
//!     Ok::<_, EndpointError>(JsonResponse::new(serde_json::json!({ "id": id })))
//! })
//! .param(Param::new("id").annotated(FieldType::Integer).located(path().build()?))
//! .allow_methods([http::Method::GET]);
//!
//! assert_eq!(get_item.name(), "get_item");
//! # Ok::<(), signet::core::DeclarationError>(())
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::Response;
use signet_core::{BoundArgs, Function};
use signet_extract::ExtractionContext;

use crate::error::EndpointError;
use crate::response::IntoResponse;

/// Boxed future returned by an erased endpoint.
pub type BoxedEndpointResult =
    Pin<Box<dyn Future<Output = Result<Response<Bytes>, EndpointError>> + Send>>;

/// A type-erased endpoint function.
pub type ErasedEndpoint =
    Arc<dyn Fn(ExtractionContext, BoundArgs) -> BoxedEndpointResult + Send + Sync>;

/// A cloneable, type-erased endpoint.
#[derive(Clone)]
pub struct Endpoint {
    inner: ErasedEndpoint,
    is_async: bool,
}

impl Endpoint {
    /// Wraps an async closure.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(ExtractionContext, BoundArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, EndpointError>> + Send + 'static,
        R: IntoResponse,
    {
        let inner: ErasedEndpoint = Arc::new(move |ctx, args| {
            let fut = f(ctx, args);
            Box::pin(async move { fut.await.map(IntoResponse::into_response) })
        });
        Self {
            inner,
            is_async: true,
        }
    }

    /// Wraps a synchronous closure. It runs on the calling task.
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(&ExtractionContext, BoundArgs) -> Result<R, EndpointError> + Send + Sync + 'static,
        R: IntoResponse,
    {
        let inner: ErasedEndpoint = Arc::new(move |ctx, args| {
            let result = f(&ctx, args).map(IntoResponse::into_response);
            Box::pin(std::future::ready(result))
        });
        Self {
            inner,
            is_async: false,
        }
    }

    /// Returns true for endpoints built with [`Endpoint::new`].
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Invokes the endpoint; errors are rendered as responses.
    pub async fn call(&self, ctx: ExtractionContext, args: BoundArgs) -> Response<Bytes> {
        match (self.inner)(ctx, args).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("is_async", &self.is_async)
            .finish_non_exhaustive()
    }
}

/// A [`Function`] around an async endpoint.
pub fn function<F, Fut, R>(name: impl Into<String>, f: F) -> Function<Endpoint>
where
    F: Fn(ExtractionContext, BoundArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, EndpointError>> + Send + 'static,
    R: IntoResponse,
{
    Function::new(name, Endpoint::new(f))
}

/// A [`Function`] around a synchronous endpoint.
pub fn sync_function<F, R>(name: impl Into<String>, f: F) -> Function<Endpoint>
where
    F: Fn(&ExtractionContext, BoundArgs) -> Result<R, EndpointError> + Send + Sync + 'static,
    R: IntoResponse,
{
    Function::new(name, Endpoint::sync(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{StatusCode, Uri};
    use serde_json::{json, Value};

    fn ctx() -> ExtractionContext {
        ExtractionContext::builder()
            .uri(Uri::from_static("/ping"))
            .build()
    }

    #[tokio::test]
    async fn test_async_endpoint() {
        let endpoint = Endpoint::new(|ctx: ExtractionContext, _args| async move {
            Ok::<_, EndpointError>(json!({ "path": ctx.path() }))
        });
        assert!(endpoint.is_async());

        let response = endpoint.call(ctx(), BoundArgs::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "path": "/ping" }));
    }

    #[tokio::test]
    async fn test_sync_endpoint() {
        let endpoint = Endpoint::sync(|_ctx, _args| Ok("pong"));
        assert!(!endpoint.is_async());

        let response = endpoint.call(ctx(), BoundArgs::default()).await;
        assert_eq!(response.body().as_ref(), b"pong");
    }

    #[tokio::test]
    async fn test_endpoint_error_becomes_response() {
        let endpoint = Endpoint::sync(|_ctx, args: BoundArgs| {
            let id: i64 = args.get("id")?;
            Ok(id.to_string())
        });

        let response = endpoint.call(ctx(), BoundArgs::default()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_function_helpers() {
        let f = sync_function("ping", |_ctx, _args| Ok(StatusCode::NO_CONTENT));
        assert_eq!(f.name(), "ping");
        assert!(!f.endpoint().is_async());
    }
}
