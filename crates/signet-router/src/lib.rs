//! Route matching for Signet.
//!
//! The host glue needs two things from routing: a way to turn a request
//! path into a registered route plus its matched path parameters, and a
//! canonical `{name}` URL template for documentation. This crate provides
//! both.
//!
//! - [`Router`] is a radix tree keyed by template segments. Static
//!   segments beat `{param}` segments, which beat `*rest` wildcards.
//! - [`normalize_template`] rewrites framework-style patterns such as
//!   `/item/<int:id>` or `^item/(?P<id>\d+)$` into `/item/{id}`.
//! - [`join_prefix`] nests a route group below a prefix.
//!
//! # Example
//!
//! ```rust
//! use signet_router::{normalize_template, Router};
//!
//! let mut router = Router::new();
//! router.insert(&normalize_template("/item/<int:id>"), 0usize).unwrap();
//!
//! let matched = router.at("/item/7").unwrap();
//! assert_eq!(*matched.value, 0);
//! assert_eq!(matched.params.get("id"), Some("7"));
//! ```

mod error;
mod node;
mod params;
mod router;
mod template;

pub use error::RouteError;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::{Match, Router};
pub use template::{join_prefix, normalize_template, template_params};
