//! Documentation Synthesizer.
//!
//! Reads cached schema bundles from a [`SchemaRegistry`] and never runs
//! analysis itself: a handler the registry has not seen is documented
//! without parameters.

use http::{Method, StatusCode};
use serde_json::{json, Value};
use signet_core::{
    merge_docs, FieldSpec, Function, Handler, Location, ResponseContent, SchemaBundle, SchemaOrigin,
    SchemaRegistry, ValidationError,
};

use crate::config::DocsConfig;
use crate::error::{DocsError, DocsResult};
use crate::openapi::{
    Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RequestBody, Response,
    Server, OPENAPI_VERSION,
};
use crate::schema::{definition_ref, field_schema, object_schema, Definitions};

/// Operations for one route plus the composite schemas they reference.
#[derive(Debug, Clone, Default)]
pub struct PathFragment {
    /// Operations keyed by method.
    pub item: PathItem,
    /// Schemas referenced from `item`.
    pub definitions: Definitions,
}

/// Builds the path item for one handler.
///
/// Plain functions produce one operation per declared method and nothing
/// when no method was declared. Method sets produce one operation per
/// member. `OPTIONS` is never documented for either.
///
/// # Errors
///
/// Returns [`DocsError::SerializationError`] if handler metadata cannot be
/// merged into an operation.
pub fn describe<E>(handler: &Handler<E>, registry: &SchemaRegistry) -> DocsResult<PathFragment> {
    let mut fragment = PathFragment::default();

    match handler {
        Handler::Function(function) => {
            let Some(methods) = function.allowed_methods() else {
                if registry
                    .bundle(function.id())
                    .is_some_and(|bundle| !bundle.is_empty())
                {
                    tracing::warn!(
                        handler = function.name(),
                        "handler binds request data but declares no HTTP method; omitted from docs"
                    );
                }
                return Ok(fragment);
            };
            let documented: Vec<&Method> = methods
                .iter()
                .filter(|method| **method != Method::OPTIONS)
                .collect();
            for &method in &documented {
                let operation_id = if documented.len() == 1 {
                    function.name().to_string()
                } else {
                    format!("{}_{}", function.name(), method.as_str().to_ascii_lowercase())
                };
                let operation = operation(function, operation_id, registry, &mut fragment.definitions)?;
                insert_operation(&mut fragment.item, method, operation);
            }
        }
        Handler::MethodSet(set) => {
            for (method, function) in set.functions() {
                if *method == Method::OPTIONS {
                    continue;
                }
                let operation_id =
                    format!("{}_{}", set.name(), method.as_str().to_ascii_lowercase());
                let operation = operation(function, operation_id, registry, &mut fragment.definitions)?;
                insert_operation(&mut fragment.item, method, operation);
            }
        }
    }

    Ok(fragment)
}

fn insert_operation(item: &mut PathItem, method: &Method, operation: Operation) {
    let name = method.as_str().to_ascii_lowercase();
    if item.set(&name, operation).is_err() {
        tracing::warn!(method = %method, "method has no OpenAPI operation slot; omitted from docs");
    }
}

/// Splits handler documentation into summary and description at the first
/// blank line.
fn split_doc(doc: Option<&str>) -> (Option<String>, Option<String>) {
    let doc = doc.map(str::trim).unwrap_or_default();
    if doc.is_empty() {
        return (None, None);
    }
    let (summary, rest) = doc.split_once("\n\n").unwrap_or((doc, ""));
    let summary = summary.lines().map(str::trim).collect::<Vec<_>>().join(" ");
    let rest = rest.trim();
    (Some(summary), (!rest.is_empty()).then(|| rest.to_string()))
}

fn parameter_in(location: Location) -> Option<ParameterIn> {
    match location {
        Location::Path => Some(ParameterIn::Path),
        Location::Query => Some(ParameterIn::Query),
        Location::Header => Some(ParameterIn::Header),
        Location::Cookie => Some(ParameterIn::Cookie),
        Location::Body => None,
    }
}

fn parameter(
    location: Location,
    param_in: ParameterIn,
    field: &FieldSpec,
    definitions: &mut Definitions,
) -> Parameter {
    Parameter {
        name: field.key_at(location).into_owned(),
        location: param_in,
        description: field.description_text().map(ToOwned::to_owned),
        required: location == Location::Path || field.is_required(),
        schema: field_schema(field, definitions),
    }
}

fn parameters(bundle: &SchemaBundle, definitions: &mut Definitions) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    for location in bundle.locations() {
        let (Some(param_in), Some(schema)) = (parameter_in(location), bundle.schema(location))
        else {
            continue;
        };
        for field in schema.fields() {
            parameters.push(parameter(location, param_in, field, definitions));
        }
    }
    parameters
}

fn request_body(bundle: &SchemaBundle, definitions: &mut Definitions) -> Option<RequestBody> {
    let schema = bundle.request_body()?;
    let media_type = if schema.has_file_fields() {
        "multipart/form-data"
    } else {
        "application/json"
    };
    let body_schema = match schema.origin() {
        SchemaOrigin::Adopted => definition_ref(schema, definitions),
        SchemaOrigin::Synthesized => object_schema(schema, definitions),
    };
    Some(RequestBody {
        required: schema.fields().iter().any(FieldSpec::is_required),
        content: [(media_type.to_string(), MediaType { schema: body_schema })]
            .into_iter()
            .collect(),
    })
}

fn validation_response() -> Response {
    Response {
        content: Some(json!({
            "application/json": {"schema": ValidationError::schema()}
        })),
        ..Response::new("Unprocessable Entity")
    }
}

fn operation<E>(
    function: &Function<E>,
    operation_id: String,
    registry: &SchemaRegistry,
    definitions: &mut Definitions,
) -> DocsResult<Operation> {
    let (summary, description) = split_doc(function.doc());
    let mut operation = Operation {
        operation_id,
        summary,
        description,
        ..Operation::default()
    };

    let bundle = registry.bundle(function.id());
    if let Some(bundle) = bundle {
        operation.parameters = parameters(bundle, definitions);
        operation.request_body = request_body(bundle, definitions);
    }

    for (code, doc) in function.responses() {
        let content = match doc.content() {
            Some(ResponseContent::Schema(schema)) => {
                let schema = serde_json::to_value(definition_ref(schema, definitions))?;
                Some(json!({"application/json": {"schema": schema}}))
            }
            Some(ResponseContent::Media(media)) => Some(media.clone()),
            None => None,
        };
        operation.responses.insert(
            code.to_string(),
            Response {
                description: doc.description().to_string(),
                content,
                headers: doc.header_docs().cloned(),
                links: doc.link_docs().cloned(),
            },
        );
    }
    if operation.responses.is_empty() {
        operation
            .responses
            .insert(StatusCode::OK.as_u16().to_string(), Response::new("OK"));
    }
    if bundle.is_some_and(|bundle| !bundle.is_empty()) {
        operation
            .responses
            .entry(StatusCode::UNPROCESSABLE_ENTITY.as_u16().to_string())
            .or_insert_with(validation_response);
    }

    if function.extra_docs().is_empty() {
        return Ok(operation);
    }
    let mut value = serde_json::to_value(&operation)?;
    if let Value::Object(map) = &mut value {
        merge_docs(map, function.extra_docs().clone());
    }
    Ok(serde_json::from_value(value)?)
}

/// Converts a route template into an OpenAPI path (`*rest` becomes `{rest}`).
///
/// # Errors
///
/// Returns [`DocsError::InvalidTemplate`] for a template without a leading
/// slash.
pub fn openapi_path(template: &str) -> DocsResult<String> {
    if !template.starts_with('/') {
        return Err(DocsError::InvalidTemplate {
            template: template.to_string(),
            reason: "must start with '/'".to_string(),
        });
    }
    Ok(template
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix('*')
                .map_or_else(|| segment.to_string(), |name| format!("{{{name}}}"))
        })
        .collect::<Vec<_>>()
        .join("/"))
}

/// Generator for OpenAPI documents.
///
/// # Example
///
/// ```rust
/// use signet_core::{Function, Handler, SchemaRegistry};
/// use signet_docs::OpenApiGenerator;
/// use http::Method;
///
/// let handler: Handler<()> = Function::new("health", ())
///     .allow_methods([Method::GET])
///     .into();
///
/// let generator = OpenApiGenerator::new("Example", "1.0.0");
/// let doc = generator
///     .generate([("/health", &handler)], &SchemaRegistry::new())
///     .unwrap();
///
/// assert!(doc.operation("/health", "get").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<Server>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::from_config(&DocsConfig::default())
    }
}

impl OpenApiGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            servers: Vec::new(),
        }
    }

    /// Create a generator from documentation settings.
    #[must_use]
    pub fn from_config(config: &DocsConfig) -> Self {
        let mut generator = Self::new(&config.title, &config.version);
        generator.description.clone_from(&config.description);
        for url in &config.servers {
            generator = generator.server(url, None);
        }
        generator
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Generate a document for `(template, handler)` routes.
    ///
    /// # Errors
    ///
    /// Returns an error if a template is invalid or handler metadata cannot
    /// be merged.
    pub fn generate<'a, E, I>(&self, routes: I, registry: &SchemaRegistry) -> DocsResult<OpenApi>
    where
        E: 'a,
        I: IntoIterator<Item = (&'a str, &'a Handler<E>)>,
    {
        let mut doc = OpenApi {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            paths: indexmap::IndexMap::new(),
            definitions: Definitions::new(),
        };

        for (template, handler) in routes {
            let fragment = describe(handler, registry)?;
            for (name, schema) in fragment.definitions {
                doc.definitions.entry(name).or_insert(schema);
            }
            if fragment.item.is_empty() {
                continue;
            }
            doc.paths
                .entry(openapi_path(template)?)
                .or_default()
                .merge(fragment.item);
        }

        Ok(doc)
    }

    /// Generate the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if generation or serialization fails.
    pub fn generate_json<'a, E, I>(&self, routes: I, registry: &SchemaRegistry) -> DocsResult<String>
    where
        E: 'a,
        I: IntoIterator<Item = (&'a str, &'a Handler<E>)>,
    {
        Ok(serde_json::to_string_pretty(&self.generate(routes, registry)?)?)
    }
}
