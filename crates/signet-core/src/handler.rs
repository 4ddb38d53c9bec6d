//! Handler descriptors.
//!
//! A [`Handler`] is either a single [`Function`] or a [`MethodSet`]
//! multiplexing several functions by HTTP method. Both are generic over
//! the endpoint `E` the host actually invokes, so this crate stays
//! independent of any runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::merge::merge_docs;
use crate::schema::CompositeSchema;
use crate::signature::{Param, Signature};

/// Process-unique handler identity, the key of the schema registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Body of a documented response.
#[derive(Debug, Clone)]
pub enum ResponseContent {
    /// JSON response described by a composite schema.
    Schema(CompositeSchema),
    /// A literal OpenAPI `content` map.
    Media(Value),
}

/// Documentation for one response status.
#[derive(Debug, Clone, Default)]
pub struct ResponseDoc {
    description: String,
    content: Option<ResponseContent>,
    headers: Option<Value>,
    links: Option<Value>,
}

impl ResponseDoc {
    /// A response with a description. An empty description is replaced by
    /// the status code's reason phrase when attached.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// JSON content described by `schema`.
    #[must_use]
    pub fn schema(mut self, schema: CompositeSchema) -> Self {
        self.content = Some(ResponseContent::Schema(schema));
        self
    }

    /// Literal `content` map.
    #[must_use]
    pub fn media(mut self, content: Value) -> Self {
        self.content = Some(ResponseContent::Media(content));
        self
    }

    /// OpenAPI `headers` object.
    #[must_use]
    pub fn headers(mut self, headers: Value) -> Self {
        self.headers = Some(headers);
        self
    }

    /// OpenAPI `links` object.
    #[must_use]
    pub fn links(mut self, links: Value) -> Self {
        self.links = Some(links);
        self
    }

    /// Description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Content, if documented.
    pub fn content(&self) -> Option<&ResponseContent> {
        self.content.as_ref()
    }

    /// Headers object, if documented.
    pub fn header_docs(&self) -> Option<&Value> {
        self.headers.as_ref()
    }

    /// Links object, if documented.
    pub fn link_docs(&self) -> Option<&Value> {
        self.links.as_ref()
    }
}

/// A single callable handler.
#[derive(Clone)]
pub struct Function<E> {
    id: HandlerId,
    name: String,
    doc: Option<String>,
    signature: Signature,
    methods: Option<Vec<Method>>,
    responses: BTreeMap<u16, ResponseDoc>,
    extra_docs: Map<String, Value>,
    endpoint: E,
}

impl<E> Function<E> {
    /// Creates a function with an empty signature.
    pub fn new(name: impl Into<String>, endpoint: E) -> Self {
        Self {
            id: HandlerId::next(),
            name: name.into(),
            doc: None,
            signature: Signature::new(),
            methods: None,
            responses: BTreeMap::new(),
            extra_docs: Map::new(),
            endpoint,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.signature = self.signature.param(param);
        self
    }

    /// Replaces the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Sets the doc text. The first paragraph is the summary.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Restricts the function to `methods`.
    #[must_use]
    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        let mut list: Vec<Method> = Vec::new();
        for method in methods {
            if !list.contains(&method) {
                list.push(method);
            }
        }
        self.methods = Some(list);
        self
    }

    /// Documents one response status.
    #[must_use]
    pub fn describe_response(mut self, status: StatusCode, mut response: ResponseDoc) -> Self {
        if response.description.is_empty() {
            response.description = status.canonical_reason().unwrap_or_default().to_string();
        }
        self.responses.insert(status.as_u16(), response);
        self
    }

    /// Documents several response statuses.
    #[must_use]
    pub fn describe_responses(
        self,
        responses: impl IntoIterator<Item = (StatusCode, ResponseDoc)>,
    ) -> Self {
        responses
            .into_iter()
            .fold(self, |f, (status, response)| f.describe_response(status, response))
    }

    /// Deep-merges free-form operation metadata.
    ///
    /// Non-object values are ignored.
    #[must_use]
    pub fn describe_extra_docs(mut self, docs: Value) -> Self {
        if let Value::Object(docs) = docs {
            merge_docs(&mut self.extra_docs, docs);
        }
        self
    }

    /// Adds operation tags.
    #[must_use]
    pub fn mark_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Value> = tags.into_iter().map(|t| Value::String(t.into())).collect();
        let mut docs = Map::new();
        docs.insert("tags".to_string(), Value::Array(tags));
        self.describe_extra_docs(Value::Object(docs))
    }

    /// Identity.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Name, used in declaration errors and synthesized schema names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Doc text.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Declared signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Allowed methods; `None` answers any method.
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        self.methods.as_deref()
    }

    /// Documented responses by status code.
    pub fn responses(&self) -> &BTreeMap<u16, ResponseDoc> {
        &self.responses
    }

    /// Merged free-form operation metadata.
    pub fn extra_docs(&self) -> &Map<String, Value> {
        &self.extra_docs
    }

    /// The endpoint the host invokes.
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

impl<E> fmt::Debug for Function<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Several functions multiplexed by HTTP method.
#[derive(Clone)]
pub struct MethodSet<E> {
    id: HandlerId,
    name: String,
    methods: IndexMap<Method, Function<E>>,
}

impl<E> MethodSet<E> {
    /// An empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HandlerId::next(),
            name: name.into(),
            methods: IndexMap::new(),
        }
    }

    /// Answers `method` with `function`, replacing any previous one.
    #[must_use]
    pub fn method(mut self, method: Method, function: Function<E>) -> Self {
        self.methods.insert(method, function);
        self
    }

    /// Shorthand for `method(Method::GET, ..)`.
    #[must_use]
    pub fn get(self, function: Function<E>) -> Self {
        self.method(Method::GET, function)
    }

    /// Shorthand for `method(Method::POST, ..)`.
    #[must_use]
    pub fn post(self, function: Function<E>) -> Self {
        self.method(Method::POST, function)
    }

    /// Shorthand for `method(Method::PUT, ..)`.
    #[must_use]
    pub fn put(self, function: Function<E>) -> Self {
        self.method(Method::PUT, function)
    }

    /// Shorthand for `method(Method::DELETE, ..)`.
    #[must_use]
    pub fn delete(self, function: Function<E>) -> Self {
        self.method(Method::DELETE, function)
    }

    /// Shorthand for `method(Method::PATCH, ..)`.
    #[must_use]
    pub fn patch(self, function: Function<E>) -> Self {
        self.method(Method::PATCH, function)
    }

    /// Deep-merges metadata into every member registered so far.
    #[must_use]
    pub fn describe_extra_docs(mut self, docs: Value) -> Self {
        self.methods = self
            .methods
            .into_iter()
            .map(|(m, f)| (m, f.describe_extra_docs(docs.clone())))
            .collect();
        self
    }

    /// Tags every member registered so far.
    #[must_use]
    pub fn mark_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Value> = tags.into_iter().map(|t| Value::String(t.into())).collect();
        let mut docs = Map::new();
        docs.insert("tags".to_string(), Value::Array(tags));
        self.describe_extra_docs(Value::Object(docs))
    }

    /// Identity of the set as a whole.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function answering `method`.
    pub fn function(&self, method: &Method) -> Option<&Function<E>> {
        self.methods.get(method)
    }

    /// Members in registration order.
    pub fn functions(&self) -> impl Iterator<Item = (&Method, &Function<E>)> {
        self.methods.iter()
    }

    /// Declared methods plus the automatic `OPTIONS`.
    pub fn allowed(&self) -> Vec<Method> {
        let mut allowed: Vec<Method> = self.methods.keys().cloned().collect();
        if !allowed.contains(&Method::OPTIONS) {
            allowed.push(Method::OPTIONS);
        }
        allowed
    }
}

impl<E> fmt::Debug for MethodSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Outcome of matching a request method against a handler.
#[derive(Debug)]
pub enum Resolution<'a, E> {
    /// Invoke this function.
    Call(&'a Function<E>),
    /// Answer an automatic `OPTIONS` with these methods.
    Options(Vec<Method>),
    /// Reject with 405, listing the allowed methods.
    NotAllowed(Vec<Method>),
}

/// A routable handler.
#[derive(Debug, Clone)]
pub enum Handler<E> {
    /// A single function.
    Function(Function<E>),
    /// Functions multiplexed by method.
    MethodSet(MethodSet<E>),
}

impl<E> Handler<E> {
    /// Identity.
    pub fn id(&self) -> HandlerId {
        match self {
            Self::Function(f) => f.id(),
            Self::MethodSet(set) => set.id(),
        }
    }

    /// Name.
    pub fn name(&self) -> &str {
        match self {
            Self::Function(f) => f.name(),
            Self::MethodSet(set) => set.name(),
        }
    }

    /// Every function reachable through this handler.
    pub fn functions(&self) -> Vec<&Function<E>> {
        match self {
            Self::Function(f) => vec![f],
            Self::MethodSet(set) => set.methods.values().collect(),
        }
    }

    /// Picks what answers `method`.
    pub fn resolve(&self, method: &Method) -> Resolution<'_, E> {
        match self {
            Self::Function(f) => match f.allowed_methods() {
                Some(allowed) if !allowed.contains(method) => Resolution::NotAllowed(allowed.to_vec()),
                _ => Resolution::Call(f),
            },
            Self::MethodSet(set) => match set.function(method) {
                Some(f) => Resolution::Call(f),
                None if *method == Method::OPTIONS => Resolution::Options(set.allowed()),
                None => Resolution::NotAllowed(set.allowed()),
            },
        }
    }
}

impl<E> From<Function<E>> for Handler<E> {
    fn from(f: Function<E>) -> Self {
        Self::Function(f)
    }
}

impl<E> From<MethodSet<E>> for Handler<E> {
    fn from(set: MethodSet<E>) -> Self {
        Self::MethodSet(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_are_unique() {
        let a = Function::new("a", ());
        let b = Function::new("b", ());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_describe_response_fills_reason() {
        let f = Function::new("get", ())
            .describe_response(StatusCode::NOT_FOUND, ResponseDoc::new(""))
            .describe_response(StatusCode::OK, ResponseDoc::new("The item"));

        assert_eq!(f.responses()[&404].description(), "Not Found");
        assert_eq!(f.responses()[&200].description(), "The item");
    }

    #[test]
    fn test_tags_accumulate() {
        let f = Function::new("get", ())
            .mark_tags(["items"])
            .mark_tags(["public"])
            .describe_extra_docs(json!({"deprecated": true}));

        assert_eq!(f.extra_docs()["tags"], json!(["items", "public"]));
        assert_eq!(f.extra_docs()["deprecated"], json!(true));
    }

    #[test]
    fn test_resolve_function() {
        let f: Handler<()> = Function::new("get", ()).allow_methods([Method::GET, Method::GET]).into();
        assert!(matches!(f.resolve(&Method::GET), Resolution::Call(_)));
        match f.resolve(&Method::POST) {
            Resolution::NotAllowed(allowed) => assert_eq!(allowed, vec![Method::GET]),
            other => panic!("unexpected {other:?}"),
        }

        let any: Handler<()> = Function::new("any", ()).into();
        assert!(matches!(any.resolve(&Method::DELETE), Resolution::Call(_)));
    }

    #[test]
    fn test_resolve_method_set() {
        let set: Handler<()> = MethodSet::new("Items")
            .get(Function::new("get", ()))
            .post(Function::new("post", ()))
            .into();

        assert!(matches!(set.resolve(&Method::POST), Resolution::Call(f) if f.name() == "post"));
        match set.resolve(&Method::OPTIONS) {
            Resolution::Options(allowed) => {
                assert_eq!(allowed, vec![Method::GET, Method::POST, Method::OPTIONS]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(set.resolve(&Method::PUT), Resolution::NotAllowed(_)));
    }

    #[test]
    fn test_method_set_tags_members() {
        let set = MethodSet::new("Items")
            .get(Function::new("get", ()))
            .post(Function::new("post", ()))
            .mark_tags(["items"]);

        for (_, f) in set.functions() {
            assert_eq!(f.extra_docs()["tags"], json!(["items"]));
        }
    }
}
