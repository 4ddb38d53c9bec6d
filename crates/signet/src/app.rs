//! Application assembly and request dispatch.
//!
//! [`AppBuilder`] collects routes, analyzes every handler once at startup
//! and freezes everything into an immutable [`App`]. [`App::handle`] then
//! answers requests in a fixed order:
//!
//! 1. the OpenAPI document, when enabled and requested with `GET`
//! 2. route match, `404` on a miss
//! 3. method check, `405` with an `Allow` header, or an automatic
//!    `OPTIONS` answer for method sets
//! 4. extraction, `400`/`413` on malformed or oversized payloads
//! 5. binding, `422` with the validation error document
//! 6. endpoint invocation

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use signet_config::SignetConfig;
use signet_core::{Handler, Location, Resolution, SchemaRegistry};
use signet_docs::{DocsError, OpenApi, OpenApiGenerator};
use signet_extract::{ExtractConfig, ExtractionContext, RequestExtractor};
use signet_router::{join_prefix, normalize_template, template_params, Match, Router};
use tracing::{debug, error, warn};

use crate::endpoint::Endpoint;
use crate::error::AppError;
use crate::response::{json_response, options_response, ErrorResponse, IntoResponse};

#[derive(Debug, Clone)]
struct Route {
    template: String,
    handler: Handler<Endpoint>,
}

/// A group of routes mounted together with [`AppBuilder::nest`].
#[derive(Debug, Clone, Default)]
pub struct Routes {
    routes: Vec<Route>,
}

impl Routes {
    /// An empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route relative to the group's prefix.
    #[must_use]
    pub fn route(mut self, template: &str, handler: impl Into<Handler<Endpoint>>) -> Self {
        self.routes.push(Route {
            template: normalize_template(template),
            handler: handler.into(),
        });
        self
    }

    /// Number of routes in the group.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when the group has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Debug, Clone)]
struct DocsRoute {
    path: String,
    generator: OpenApiGenerator,
}

/// Collects routes and settings, then builds an [`App`].
///
/// # Example
///
/// ```rust
/// use signet::prelude::*;
///
/// let app = AppBuilder::new()
///     .route("/ping", sync_function("ping", |_ctx, _args| Ok("pong")))
///     .docs("/openapi.json", OpenApiGenerator::new("Demo", "1.0.0"))
///     .build()?;
///
/// assert!(app.openapi().is_some());
/// # Ok::<(), AppError>(())
/// ```
#[derive(Debug, Default)]
pub struct AppBuilder {
    routes: Vec<Route>,
    registry: SchemaRegistry,
    extract_config: ExtractConfig,
    docs: Option<DocsRoute>,
}

impl AppBuilder {
    /// An empty builder with default extraction settings and no docs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder configured from loaded settings.
    #[must_use]
    pub fn from_config(config: &SignetConfig) -> Self {
        let mut builder = Self::new().extract_config(config.extraction.clone());
        if config.docs.enabled {
            builder = builder.docs(&config.docs.path, OpenApiGenerator::from_config(&config.docs));
        }
        builder
    }

    /// Adds a route. The template may use `{name}`, `<name>` or `<conv:name>`.
    #[must_use]
    pub fn route(mut self, template: &str, handler: impl Into<Handler<Endpoint>>) -> Self {
        self.routes.push(Route {
            template: normalize_template(template),
            handler: handler.into(),
        });
        self
    }

    /// Mounts a group of routes under `prefix`.
    #[must_use]
    pub fn nest(mut self, prefix: &str, routes: Routes) -> Self {
        for route in routes.routes {
            self.routes.push(Route {
                template: join_prefix(prefix, &route.template),
                handler: route.handler,
            });
        }
        self
    }

    /// Replaces the extraction settings.
    #[must_use]
    pub fn extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract_config = config;
        self
    }

    /// Serves the generated OpenAPI document at `path`.
    #[must_use]
    pub fn docs(mut self, path: &str, generator: OpenApiGenerator) -> Self {
        self.docs = Some(DocsRoute {
            path: path.to_string(),
            generator,
        });
        self
    }

    /// Analyzes every registered handler.
    ///
    /// Safe to call more than once; already analyzed handlers are served
    /// from the registry cache.
    ///
    /// # Errors
    ///
    /// The first declaration error found.
    pub fn ready(&mut self) -> Result<(), AppError> {
        for route in &self.routes {
            self.registry.analyze(&route.handler)?;
            check_path_fields(route, &self.registry);
        }
        debug!(
            routes = self.routes.len(),
            handlers = self.registry.len(),
            "application ready"
        );
        Ok(())
    }

    /// Analyzes all handlers and freezes the application.
    ///
    /// # Errors
    ///
    /// Declaration errors, invalid or duplicate route templates, and
    /// document generation failures.
    pub fn build(mut self) -> Result<App, AppError> {
        self.ready()?;

        let mut router = Router::new();
        for (index, route) in self.routes.iter().enumerate() {
            router.insert(&route.template, index)?;
        }

        let docs = match &self.docs {
            Some(docs) => {
                let document = docs.generator.generate(
                    self.routes.iter().map(|r| (r.template.as_str(), &r.handler)),
                    &self.registry,
                )?;
                let body = serde_json::to_vec(&document).map_err(DocsError::from)?;
                Some(ServedDocs {
                    path: docs.path.clone(),
                    document,
                    body: Bytes::from(body),
                })
            }
            None => None,
        };

        Ok(App {
            router,
            routes: self.routes,
            registry: self.registry,
            extractor: RequestExtractor::new(self.extract_config),
            docs,
        })
    }
}

fn check_path_fields(route: &Route, registry: &SchemaRegistry) {
    let declared = template_params(&route.template);
    for function in route.handler.functions() {
        let Some(schema) = registry
            .bundle(function.id())
            .and_then(|bundle| bundle.schema(Location::Path))
        else {
            continue;
        };
        for field in schema.fields() {
            if !declared.iter().any(|name| name == field.lookup_key()) {
                warn!(
                    handler = function.name(),
                    template = %route.template,
                    field = field.lookup_key(),
                    "path field has no matching template parameter"
                );
            }
        }
    }
}

#[derive(Debug)]
struct ServedDocs {
    path: String,
    document: OpenApi,
    body: Bytes,
}

/// An immutable, fully analyzed application.
#[derive(Debug)]
pub struct App {
    router: Router<usize>,
    routes: Vec<Route>,
    registry: SchemaRegistry,
    extractor: RequestExtractor,
    docs: Option<ServedDocs>,
}

impl App {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// The generated document, when docs are enabled.
    pub fn openapi(&self) -> Option<&OpenApi> {
        self.docs.as_ref().map(|docs| &docs.document)
    }

    /// The schema registry filled at startup.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Registered `(template, handler)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &Handler<Endpoint>)> {
        self.routes.iter().map(|r| (r.template.as_str(), &r.handler))
    }

    /// Answers one request.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();

        if let Some(docs) = &self.docs {
            if parts.method == Method::GET && parts.uri.path() == docs.path {
                let mut response = Response::new(docs.body.clone());
                response.headers_mut().insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );
                return response;
            }
        }

        let Some(Match { value, params }) = self.router.at(parts.uri.path()) else {
            debug!(method = %parts.method, path = parts.uri.path(), "no route matched");
            return ErrorResponse::not_found().into_response();
        };
        let route = &self.routes[*value];

        let function = match route.handler.resolve(&parts.method) {
            Resolution::Call(function) => function,
            Resolution::Options(allowed) => {
                debug!(template = %route.template, "answering OPTIONS");
                return options_response(&allowed);
            }
            Resolution::NotAllowed(allowed) => {
                debug!(
                    method = %parts.method,
                    template = %route.template,
                    "method not allowed"
                );
                return ErrorResponse::method_not_allowed(allowed).into_response();
            }
        };

        let Some(bundle) = self.registry.bundle(function.id()) else {
            error!(handler = function.name(), "handler was never analyzed");
            return ErrorResponse::internal_error().into_response();
        };

        let ctx = ExtractionContext::new(parts.method, parts.uri, parts.headers, body, params);

        let raw = match self.extractor.extract(&ctx, bundle).await {
            Ok(raw) => raw,
            Err(err) => {
                debug!(handler = function.name(), error = %err, "extraction failed");
                return err.into_response();
            }
        };

        let args = match bundle.bind(&raw) {
            Ok(args) => args,
            Err(err) => {
                debug!(
                    handler = function.name(),
                    errors = err.errors().len(),
                    "validation failed"
                );
                return err.into_response();
            }
        };

        debug!(handler = function.name(), "invoking endpoint");
        let response = function.endpoint().call(ctx, args).await;
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            debug!(handler = function.name(), "endpoint returned 500");
        }
        response
    }
}
