//! Radix tree node implementation.
//!
//! Each node owns one path segment. Route values live on the node that
//! terminates a template.

use crate::error::RouteError;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "item", "api")
    Static,
    /// Named parameter (e.g., "{id}")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static, param, or wildcard)
    pub kind: SegmentKind,

    /// Route value if a template ends at this node
    pub value: Option<T>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node<T>>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node<T>>>,

    /// Wildcard child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            value: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: impl Into<String>) -> Self {
        Self::with_kind(segment.into(), SegmentKind::Static)
    }

    /// Creates a new parameter node.
    #[must_use]
    pub fn new_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(format!("{{{name}}}"), SegmentKind::Param(name))
    }

    /// Creates a new wildcard node.
    #[must_use]
    pub fn new_wildcard(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(format!("*{name}"), SegmentKind::Wildcard(name))
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new_static("")
    }

    /// Inserts a route template into the tree.
    ///
    /// # Errors
    ///
    /// Fails when the template is already present, when a wildcard is not
    /// the final segment, or when a parameter segment has no name.
    pub fn insert(&mut self, template: &str, value: T) -> Result<(), RouteError> {
        let segments = Self::parse_path(template)?;
        if let Some(pos) = segments
            .iter()
            .position(|(_, kind)| matches!(kind, SegmentKind::Wildcard(_)))
        {
            if pos + 1 != segments.len() {
                return Err(RouteError::WildcardNotLast {
                    template: template.to_string(),
                });
            }
        }
        self.insert_segments(&segments, value, template)
    }

    /// Parses a template into segments.
    pub(crate) fn parse_path(template: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
        template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    SegmentKind::Param(name.to_string())
                } else if let Some(name) = s.strip_prefix('*') {
                    SegmentKind::Wildcard(name.to_string())
                } else {
                    return Ok((s.to_string(), SegmentKind::Static));
                };
                let unnamed = matches!(&kind, SegmentKind::Param(n) | SegmentKind::Wildcard(n) if n.is_empty());
                if unnamed {
                    return Err(RouteError::UnnamedParameter {
                        template: template.to_string(),
                    });
                }
                Ok((s.to_string(), kind))
            })
            .collect()
    }

    fn insert_segments(
        &mut self,
        segments: &[(String, SegmentKind)],
        value: T,
        template: &str,
    ) -> Result<(), RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            if self.value.is_some() {
                return Err(RouteError::Duplicate {
                    template: template.to_string(),
                });
            }
            self.value = Some(value);
            return Ok(());
        };

        match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children.insert(index, Node::new_static(segment.clone()));
                        index
                    }
                };
                self.static_children[index].insert_segments(remaining, value, template)
            }
            SegmentKind::Param(name) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new_param(name.clone())))
                .same_kind(kind, segment, template)?
                .insert_segments(remaining, value, template),
            SegmentKind::Wildcard(name) => self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::new_wildcard(name.clone())))
                .same_kind(kind, segment, template)?
                .insert_segments(remaining, value, template),
        }
    }

    fn same_kind(
        &mut self,
        kind: &SegmentKind,
        segment: &str,
        template: &str,
    ) -> Result<&mut Self, RouteError> {
        if self.kind == *kind {
            return Ok(self);
        }
        Err(RouteError::ParamNameConflict {
            template: template.to_string(),
            existing: self.segment.clone(),
            segment: segment.to_string(),
        })
    }

    /// Matches a concrete path against the tree.
    ///
    /// Returns the route value and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&T, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let value = self.match_segments(&segments, &mut params)?;
        Some((value, params))
    }

    fn match_segments<'a>(&'a self, segments: &[&str], params: &mut Params) -> Option<&'a T> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.value.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(value) = child.match_segments(remaining, params) {
                return Some(value);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), decode_segment(segment));
                if let Some(value) = child.match_segments(remaining, params) {
                    return Some(value);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                let rest: Vec<String> = segments.iter().map(|s| decode_segment(s)).collect();
                params.push(name.clone(), rest.join("/"));
                return child.value.as_ref();
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Percent-decodes a captured segment. Invalid UTF-8 is replaced lossily.
fn decode_segment(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new_param() {
        let node: Node<()> = Node::new_param("id");
        assert_eq!(node.segment, "{id}");
        assert_eq!(node.kind, SegmentKind::Param("id".to_string()));
    }

    #[test]
    fn test_parse_path_mixed() {
        let segments = Node::<()>::parse_path("/files/{bucket}/*path").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ("files".to_string(), SegmentKind::Static));
        assert_eq!(segments[1].1, SegmentKind::Param("bucket".to_string()));
        assert_eq!(segments[2].1, SegmentKind::Wildcard("path".to_string()));
    }

    #[test]
    fn test_parse_path_rejects_unnamed() {
        let err = Node::<()>::parse_path("/users/{}").unwrap_err();
        assert!(matches!(err, RouteError::UnnamedParameter { .. }));
    }

    #[test]
    fn test_insert_and_match_param() {
        let mut root = Node::root();
        root.insert("/item/{id}", "item").unwrap();

        let (value, params) = root.match_path("/item/7").unwrap();
        assert_eq!(*value, "item");
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/users/me", 1).unwrap();
        root.insert("/users/{id}", 2).unwrap();

        assert_eq!(root.match_path("/users/me").map(|(v, _)| *v), Some(1));
        assert_eq!(root.match_path("/users/42").map(|(v, _)| *v), Some(2));
    }

    #[test]
    fn test_backtracking_drops_stale_params() {
        let mut root = Node::root();
        root.insert("/a/{x}/b", 1).unwrap();
        root.insert("/a/*rest", 2).unwrap();

        let (value, params) = root.match_path("/a/1/c").unwrap();
        assert_eq!(*value, 2);
        assert_eq!(params.get("x"), None);
        assert_eq!(params.get("rest"), Some("1/c"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut root = Node::root();
        root.insert("/users", 1).unwrap();
        let err = root.insert("/users/", 2).unwrap_err();
        assert_eq!(
            err,
            RouteError::Duplicate {
                template: "/users/".to_string()
            }
        );
    }

    #[test]
    fn test_captured_segments_are_decoded() {
        let mut root = Node::root();
        root.insert("/item/{name}", 1).unwrap();
        root.insert("/files/*path", 2).unwrap();

        let (_, params) = root.match_path("/item/a%20b").unwrap();
        assert_eq!(params.get("name"), Some("a b"));

        let (_, params) = root.match_path("/item/caf%C3%A9").unwrap();
        assert_eq!(params.get("name"), Some("café"));

        let (_, params) = root.match_path("/files/my%20docs/r%C3%A9sum%C3%A9.pdf").unwrap();
        assert_eq!(params.get("path"), Some("my docs/résumé.pdf"));
    }

    #[test]
    fn test_param_name_conflict_rejected() {
        let mut root = Node::root();
        root.insert("/item/{id}/a", 1).unwrap();
        let err = root.insert("/item/{name}/b", 2).unwrap_err();
        assert_eq!(
            err,
            RouteError::ParamNameConflict {
                template: "/item/{name}/b".to_string(),
                existing: "{id}".to_string(),
                segment: "{name}".to_string(),
            }
        );

        root.insert("/item/{id}/b", 2).unwrap();
        assert_eq!(root.match_path("/item/x/b").map(|(v, _)| *v), Some(2));
    }

    #[test]
    fn test_wildcard_name_conflict_rejected() {
        let mut root = Node::root();
        root.insert("/files/*path", 1).unwrap();
        let err = root.insert("/files/*rest", 2).unwrap_err();
        assert!(matches!(err, RouteError::ParamNameConflict { .. }));
    }

    #[test]
    fn test_wildcard_must_be_last() {
        let mut root = Node::root();
        let err = root.insert("/files/*path/meta", 1).unwrap_err();
        assert!(matches!(err, RouteError::WildcardNotLast { .. }));
    }

    #[test]
    fn test_root_route() {
        let mut root = Node::root();
        root.insert("/", 0).unwrap();
        assert!(root.match_path("/").is_some());
        assert!(root.match_path("/missing").is_none());
    }
}
