//! Declarative request-parameter binding for Signet.
//!
//! Handlers declare where each parameter comes from with a location
//! marker ([`path`], [`query`], [`header`], [`cookie`], [`body`]). At
//! startup the [`SchemaRegistry`] analyzes every handler once, deriving a
//! [`SchemaBundle`] with one composite schema per location. At request
//! time the bundle validates the extracted [`RawLocations`] and produces
//! [`BoundArgs`], or a [`ValidationError`] aggregating every failure.
//!
//! # Example
//!
//! ```rust
//! use signet_core::{path, FieldType, Function, Param, RawLocations, RawValue, SchemaRegistry, Location};
//!
//! let get = Function::new("get_item", ())
//!     .param(Param::new("id").annotated(FieldType::Integer).located(path().build().unwrap()));
//!
//! let mut registry = SchemaRegistry::new();
//! let bundle = registry.analyze_function(&get).unwrap();
//!
//! let mut raw = RawLocations::new();
//! raw.set(Location::Path, [("id".to_string(), RawValue::text("7"))].into_iter().collect());
//!
//! let args = bundle.bind(&raw).unwrap();
//! assert_eq!(args.get::<i64>("id").unwrap(), 7);
//! ```

mod analyze;
mod bind;
mod bundle;
mod error;
mod handler;
mod location;
mod marker;
mod merge;
mod schema;
mod signature;
mod validate;
mod value;

pub use analyze::{analyze_signature, SchemaRegistry};
pub use bind::bind;
pub use bundle::{ExclusiveBindingMap, SchemaBundle};
pub use error::{ArgumentError, DeclarationError, ErrorItem, ValidationError};
pub use handler::{Function, Handler, HandlerId, MethodSet, Resolution, ResponseContent, ResponseDoc};
pub use location::Location;
pub use marker::{body, cookie, header, path, query, MarkerBuilder, ParameterMarker};
pub use merge::merge_docs;
pub use schema::{
    CompositeSchema, CompositeSchemaBuilder, CompositeType, Constraints, FieldDefault, FieldSpec,
    FieldType, SchemaId, SchemaOrigin,
};
pub use signature::{Annotation, Param, ParamDefault, ParamKind, Signature};
pub use value::{BoundArgs, BoundValue, RawBody, RawData, RawLocations, RawValue, UploadedFile};
