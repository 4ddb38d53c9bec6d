//! Request locations a parameter can be bound from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The part of an HTTP request a parameter value comes from.
///
/// The declaration order is also the binding precedence: when the same
/// name is bound from two locations, the later one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Route-matched path parameters.
    Path,
    /// Query string.
    Query,
    /// Request headers.
    Header,
    /// Cookies.
    Cookie,
    /// Request payload.
    Body,
}

impl Location {
    /// Every location in binding order.
    pub const ALL: [Location; 5] = [
        Location::Path,
        Location::Query,
        Location::Header,
        Location::Cookie,
        Location::Body,
    ];

    /// Lowercase name, as used by OpenAPI `in`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }

    /// Name of the marker constructor for this location.
    pub const fn marker_name(self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Header => "Header",
            Self::Cookie => "Cookie",
            Self::Body => "Body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_order() {
        let mut sorted = Location::ALL;
        sorted.sort();
        assert_eq!(sorted, Location::ALL);
        assert_eq!(Location::ALL.first(), Some(&Location::Path));
        assert_eq!(Location::ALL.last(), Some(&Location::Body));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Location::Cookie.to_string(), "cookie");
        assert_eq!(Location::Query.marker_name(), "Query");
        assert_eq!(serde_json::to_string(&Location::Header).unwrap(), "\"header\"");
    }
}
