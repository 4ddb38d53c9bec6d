//! # Signet Test
//!
//! In-memory testing for Signet applications. Requests go through the full
//! dispatch of [`signet::App::handle`] (routing, method checks, extraction,
//! binding and the endpoint) without binding a port.
//!
//! ## Example
//!
//! ```
//! use http::{Method, StatusCode};
//! use signet::prelude::*;
//! use signet_test::TestClient;
//!
//! # tokio_test::block_on(async {
//! let get_item = sync_function("get_item", |_ctx, args| {
//!     let id: i64 = args.get("id")?;
//!     Ok(serde_json::json!({ "id": id }))
//! })
//! .param(Param::new("id").annotated(FieldType::Integer).located(path().build().unwrap()))
//! .allow_methods([Method::GET]);
//!
//! let client = TestClient::new(AppBuilder::new().route("/item/<id>", get_item).build().unwrap());
//!
//! client.get("/item/7").send().await.assert_status(StatusCode::OK);
//! client.get("/item/abc").send().await.assert_validation_locs(&[&["id"]]);
//! # });
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{MultipartForm, TestRequest, TestRequestBuilder};
pub use response::TestResponse;
