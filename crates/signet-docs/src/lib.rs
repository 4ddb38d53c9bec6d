//! # Signet Docs
//!
//! OpenAPI document generation from handler bindings.
//!
//! The generator walks registered `(template, handler)` routes and reads
//! each handler's cached [`SchemaBundle`](signet_core::SchemaBundle) from a
//! [`SchemaRegistry`](signet_core::SchemaRegistry):
//!
//! - one parameter per field of the path, query, header and cookie schemas
//! - a request body for the body schema, published under `definitions` when
//!   the handler adopted a composite type
//! - the handler's described responses, a `422` describing the validation
//!   error shape whenever anything is bound, and `200 OK` when nothing was
//!   described
//! - handler metadata (`tags`, extra fields) deep-merged into the operation
//!
//! ## Example
//!
//! ```rust
//! use signet_core::{path, FieldType, Function, Handler, Param, SchemaRegistry};
//! use signet_docs::OpenApiGenerator;
//! use http::Method;
//!
//! let handler: Handler<()> = Function::new("get_item", ())
//!     .param(Param::new("id").annotated(FieldType::Integer).located(path().build().unwrap()))
//!     .allow_methods([Method::GET])
//!     .into();
//!
//! let mut registry = SchemaRegistry::new();
//! registry.analyze(&handler).unwrap();
//!
//! let doc = OpenApiGenerator::new("Items", "1.0.0")
//!     .generate([("/item/{id}", &handler)], &registry)
//!     .unwrap();
//! let op = doc.operation("/item/{id}", "get").unwrap();
//! assert_eq!(op.parameters[0].name, "id");
//! assert!(op.responses.contains_key("422"));
//! ```

mod config;
mod error;
mod generator;
mod openapi;
mod schema;

pub use config::DocsConfig;
pub use error::{DocsError, DocsResult};
pub use generator::{describe, openapi_path, OpenApiGenerator, PathFragment};
pub use openapi::{
    Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RequestBody, Response,
    Schema, SchemaType, Server, OPENAPI_VERSION,
};
pub use schema::{definition_ref, field_schema, object_schema, Definitions};
