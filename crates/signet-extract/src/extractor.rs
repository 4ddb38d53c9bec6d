//! Per-handler request extraction.

use signet_core::{Location, RawBody, RawData, RawLocations, RawValue, SchemaBundle};

use crate::body::parse_body;
use crate::header::{parse_cookies, parse_headers};
use crate::query::parse_query;
use crate::{ExtractConfig, ExtractionContext, ExtractionError, MalformedBody};

/// Reads the raw data a handler's schemas need from a request.
///
/// Only locations present in the handler's [`SchemaBundle`] are read, so a
/// handler without a body schema never parses the body.
///
/// # Example
///
/// ```rust
/// use signet_extract::{ExtractConfig, ExtractionContext, RequestExtractor};
///
/// let extractor = RequestExtractor::new(ExtractConfig::default());
/// let ctx = ExtractionContext::builder().path_param("id", "7").build();
/// let path = extractor.path(&ctx);
/// assert_eq!(path.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestExtractor {
    config: ExtractConfig,
}

impl RequestExtractor {
    /// Creates an extractor with the given settings.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Route parameters as raw text values.
    #[must_use]
    pub fn path(&self, ctx: &ExtractionContext) -> RawData {
        ctx.path_params()
            .iter()
            .map(|(name, value)| (name.to_owned(), RawValue::text(value)))
            .collect()
    }

    /// Extracts every location the bundle binds from.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] for an oversized body, an undecodable
    /// query, or an undecodable body when the malformed body policy is
    /// [`MalformedBody::Reject`].
    pub async fn extract(
        &self,
        ctx: &ExtractionContext,
        bundle: &SchemaBundle,
    ) -> Result<RawLocations, ExtractionError> {
        let mut raw = RawLocations::new();

        for location in bundle.locations() {
            match location {
                Location::Path => raw.set(location, self.path(ctx)),
                Location::Query => raw.set(location, parse_query(ctx.query_string())?),
                Location::Header => {
                    raw.set(location, parse_headers(ctx.headers(), self.config.header_values));
                }
                Location::Cookie => raw.set(location, parse_cookies(ctx.headers())),
                Location::Body => raw.set_body(self.body(ctx).await?),
            }
        }

        Ok(raw)
    }

    async fn body(&self, ctx: &ExtractionContext) -> Result<RawBody, ExtractionError> {
        let size = ctx.body().len();
        if size > self.config.max_body_size {
            return Err(ExtractionError::payload_too_large(
                self.config.max_body_size,
                size,
            ));
        }

        match parse_body(ctx.content_type(), ctx.body(), self.config.max_multipart_fields).await {
            Ok(body) => Ok(body),
            Err(err) if err.is_malformed() && self.config.malformed_body == MalformedBody::Aggregate => {
                tracing::debug!(error = %err, "malformed body reported as validation error");
                Ok(RawBody::Malformed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri};
    use serde_json::json;
    use signet_core::{analyze_signature, body, header, path, query, FieldType, Param, Signature};

    fn bundle() -> SchemaBundle {
        let signature: Signature = [
            Param::new("id")
                .annotated(FieldType::Integer)
                .located(path().build().unwrap()),
            Param::new("q")
                .annotated(FieldType::String)
                .located(query().build().unwrap()),
            Param::new("x_token")
                .annotated(FieldType::String)
                .located(header().build().unwrap()),
            Param::new("name")
                .annotated(FieldType::String)
                .located(body().build().unwrap()),
        ]
        .into_iter()
        .collect();
        analyze_signature("handler", &signature).unwrap()
    }

    fn ctx(body: &'static str) -> ExtractionContext {
        ExtractionContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/item/7?q=find"))
            .header("content-type", "application/json")
            .header("x-token", "t")
            .path_param("id", "7")
            .body(body)
            .build()
    }

    #[tokio::test]
    async fn test_extracts_bundle_locations_only() {
        let extractor = RequestExtractor::default();
        let raw = extractor.extract(&ctx(r#"{"name": "n"}"#), &bundle()).await.unwrap();

        assert_eq!(raw.get(Location::Path).unwrap()["id"], RawValue::text("7"));
        assert_eq!(raw.get(Location::Query).unwrap()["q"], RawValue::text("find"));
        assert_eq!(raw.get(Location::Header).unwrap()["x-token"], RawValue::text("t"));
        assert!(raw.get(Location::Cookie).is_none());
        let Some(RawBody::Object(data)) = raw.body() else {
            panic!("expected object body");
        };
        assert_eq!(data["name"], RawValue::Json(json!("n")));
    }

    #[tokio::test]
    async fn test_body_skipped_without_body_schema() {
        let signature: Signature = [Param::new("id")
            .annotated(FieldType::Integer)
            .located(path().build().unwrap())]
        .into_iter()
        .collect();
        let bundle = analyze_signature("handler", &signature).unwrap();

        let raw = RequestExtractor::default()
            .extract(&ctx("{broken"), &bundle)
            .await
            .unwrap();
        assert!(raw.body().is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let err = RequestExtractor::default()
            .extract(&ctx("{broken"), &bundle())
            .await
            .unwrap_err();
        assert_eq!(err.location(), Location::Body);
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_aggregated() {
        let config = ExtractConfig::default().with_malformed_body(MalformedBody::Aggregate);
        let raw = RequestExtractor::new(config)
            .extract(&ctx("{broken"), &bundle())
            .await
            .unwrap();
        assert!(matches!(raw.body(), Some(RawBody::Malformed(_))));
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let config = ExtractConfig::default().with_max_body_size(4);
        let err = RequestExtractor::new(config)
            .extract(&ctx(r#"{"name": "n"}"#), &bundle())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }
}
