//! High-level router API.

use crate::error::RouteError;
use crate::node::Node;
use crate::params::Params;

/// A successful route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a, T> {
    /// The value registered for the matched template.
    pub value: &'a T,
    /// Captured path parameters.
    pub params: Params,
}

/// A radix tree router mapping `{name}` templates to values.
///
/// Routes are matched segment by segment with the priority static, then
/// `{param}`, then `*wildcard`. Methods are not part of the key: callers
/// store whatever per-route dispatch data they need in `T`.
///
/// # Example
///
/// ```rust
/// use signet_router::Router;
///
/// let mut router = Router::new();
/// router.insert("/users/{id}", "user").unwrap();
///
/// let found = router.at("/users/12").unwrap();
/// assert_eq!(*found.value, "user");
/// assert_eq!(found.params.get("id"), Some("12"));
/// assert!(router.at("/posts").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers a `{name}` template.
    ///
    /// # Errors
    ///
    /// See [`RouteError`].
    pub fn insert(&mut self, template: &str, value: T) -> Result<(), RouteError> {
        self.root.insert(template, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Looks up a concrete request path.
    #[must_use]
    pub fn at(&self, path: &str) -> Option<Match<'_, T>> {
        let (value, params) = self.root.match_path(path)?;
        Some(Match { value, params })
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_new() {
        let router: Router<usize> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_counts_only_successful_inserts() {
        let mut router = Router::new();
        router.insert("/users", 0).unwrap();
        assert!(router.insert("/users", 1).is_err());
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_router_nested_params() {
        let mut router = Router::new();
        router.insert("/orgs/{org}/users/{user}", 3).unwrap();

        let found = router.at("/orgs/acme/users/9").unwrap();
        assert_eq!(*found.value, 3);
        assert_eq!(found.params.get("org"), Some("acme"));
        assert_eq!(found.params.get("user"), Some("9"));
    }

    #[test]
    fn test_router_wildcard() {
        let mut router = Router::new();
        router.insert("/static/*path", 1).unwrap();

        let found = router.at("/static/css/site.css").unwrap();
        assert_eq!(found.params.get("path"), Some("css/site.css"));
    }
}
