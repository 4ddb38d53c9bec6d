//! # Signet
//!
//! **Declarative request-parameter binding and OpenAPI generation for HTTP handlers**
//!
//! Handlers declare where each parameter comes from (path, query, header,
//! cookie or body) together with its type, default and constraints. Signet
//! then:
//!
//! - analyzes every handler once at startup into cached schemas
//! - extracts and validates each request against those schemas, answering
//!   `422` with a structured error document on failure
//! - generates an OpenAPI 3.0 document from the same declarations
//!
//! ## Quick Start
//!
//! ```rust
//! use signet::prelude::*;
//! use http::Method;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let get_item = sync_function("get_item", |_ctx, args| {
//!     let id: i64 = args.get("id")?;
//!     let verbose: bool = args.get("verbose")?;
//!     Ok(JsonResponse::new(serde_json::json!({ "id": id, "verbose": verbose })))
//! })
//! .param(Param::new("id").annotated(FieldType::Integer).located(path().build()?))
//! .param(
//!     Param::new("verbose")
//!         .annotated(FieldType::Boolean)
//!         .located(query().default_value(false).build()?),
//! )
//! .allow_methods([Method::GET]);
//!
//! let app = AppBuilder::new()
//!     .route("/item/<int:id>", get_item)
//!     .docs("/openapi.json", OpenApiGenerator::new("Items", "1.0.0"))
//!     .build()?;
//!
//! let request = http::Request::get("/item/7?verbose=true").body(bytes::Bytes::new())?;
//! let response = app.handle(request).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! Request → route match → method check → extract → bind → endpoint
//!              404            405/OPTIONS   400/413   422
//! ```

#![doc(html_root_url = "https://docs.rs/signet/0.1.0")]
#![forbid(unsafe_code)]

pub mod app;
pub mod endpoint;
pub mod error;
pub mod response;

// Re-export core types
pub use signet_core as core;
// Re-export router types
pub use signet_router as router;
// Re-export extraction types
pub use signet_extract as extract;
// Re-export documentation types
pub use signet_docs as docs;
// Re-export configuration types
pub use signet_config as config;
// Re-export logging setup
pub use signet_telemetry as telemetry;

pub use app::{App, AppBuilder, Routes};
pub use endpoint::{function, sync_function, Endpoint};
pub use error::{AppError, EndpointError};
pub use response::{json_response, ErrorResponse, IntoResponse, JsonResponse};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use signet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{App, AppBuilder, Routes};
    pub use crate::endpoint::{function, sync_function, Endpoint};
    pub use crate::error::{AppError, EndpointError};
    pub use crate::response::{ErrorResponse, IntoResponse, JsonResponse};

    pub use signet_core::{
        body, cookie, header, path, query, BoundArgs, CompositeSchema, CompositeType,
        DeclarationError, FieldSpec, FieldType, Function, Handler, MethodSet, Param,
        ResponseDoc, UploadedFile, ValidationError,
    };
    pub use signet_config::{ConfigLoader, SignetConfig};
    pub use signet_docs::OpenApiGenerator;
    pub use signet_extract::{ExtractConfig, ExtractionContext, HeaderValues, MalformedBody};
    pub use signet_telemetry::{init_logging, LogConfig};
}
