//! Route registration errors.

use thiserror::Error;

/// Errors raised while registering a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template was already registered.
    #[error("route `{template}` is already registered")]
    Duplicate {
        /// The conflicting template.
        template: String,
    },

    /// A `*wildcard` segment was followed by more segments.
    #[error("wildcard segment must be the last segment in `{template}`")]
    WildcardNotLast {
        /// The offending template.
        template: String,
    },

    /// A `{}` or `*` segment without a name.
    #[error("unnamed parameter segment in `{template}`")]
    UnnamedParameter {
        /// The offending template.
        template: String,
    },

    /// Two templates name the parameter at the same position differently.
    #[error("`{template}` names parameter `{segment}` where `{existing}` is already registered")]
    ParamNameConflict {
        /// The template being registered.
        template: String,
        /// The segment already in the tree.
        existing: String,
        /// The conflicting segment.
        segment: String,
    },
}
