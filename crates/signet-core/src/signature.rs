//! Explicit handler signatures.
//!
//! Handlers describe their parameters up front instead of being
//! introspected at runtime. The analyzer reads these descriptions once.

use serde_json::Value;

use crate::marker::ParameterMarker;
use crate::schema::{CompositeSchema, CompositeType, FieldType};

/// How a parameter is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// An ordinary named parameter.
    #[default]
    Regular,
    /// The request object, injected by the host.
    Request,
    /// The bound receiver of a method.
    Receiver,
    /// Positional catch-all.
    VarPositional,
    /// Keyword catch-all.
    VarKeyword,
}

impl ParamKind {
    /// Returns true for parameters the host supplies itself.
    pub fn is_injected(self) -> bool {
        !matches!(self, Self::Regular)
    }
}

/// A parameter's type annotation.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// A plain field type.
    Field(FieldType),
    /// A composite schema type.
    Composite(CompositeSchema),
}

impl Annotation {
    /// Annotation naming a user composite type.
    pub fn composite<T: CompositeType>() -> Self {
        Self::Composite(T::composite_schema())
    }

    /// Field type this annotation validates as.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Field(ty) => ty.clone(),
            Self::Composite(schema) => FieldType::Object(schema.clone()),
        }
    }
}

impl From<FieldType> for Annotation {
    fn from(ty: FieldType) -> Self {
        Self::Field(ty)
    }
}

impl From<CompositeSchema> for Annotation {
    fn from(schema: CompositeSchema) -> Self {
        Self::Composite(schema)
    }
}

/// A parameter's default.
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// A location marker.
    Marker(ParameterMarker),
    /// Any other default; the parameter is not request-bound.
    Value(Value),
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    kind: ParamKind,
    annotation: Option<Annotation>,
    default: Option<ParamDefault>,
}

impl Param {
    /// A regular parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::Regular)
    }

    /// A parameter of the given kind.
    pub fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation: None,
            default: None,
        }
    }

    /// The injected request parameter.
    pub fn request() -> Self {
        Self::with_kind("request", ParamKind::Request)
    }

    /// The method receiver.
    pub fn receiver() -> Self {
        Self::with_kind("self", ParamKind::Receiver)
    }

    /// Sets the type annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Annotates with a user composite type.
    #[must_use]
    pub fn composite<T: CompositeType>(self) -> Self {
        self.annotated(Annotation::composite::<T>())
    }

    /// Uses a location marker as the default.
    #[must_use]
    pub fn located(mut self, marker: ParameterMarker) -> Self {
        self.default = Some(ParamDefault::Marker(marker));
        self
    }

    /// Uses a plain value as the default.
    #[must_use]
    pub fn defaulted(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ParamDefault::Value(value.into()));
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Type annotation.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Default.
    pub fn default(&self) -> Option<&ParamDefault> {
        self.default.as_ref()
    }

    /// The location marker, if the default is one.
    pub fn marker(&self) -> Option<&ParameterMarker> {
        match &self.default {
            Some(ParamDefault::Marker(marker)) => Some(marker),
            _ => None,
        }
    }
}

/// Ordered parameter list of a handler.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// An empty signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true for an empty signature.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::query;

    #[test]
    fn test_injected_kinds() {
        assert!(Param::request().kind().is_injected());
        assert!(Param::receiver().kind().is_injected());
        assert!(Param::with_kind("args", ParamKind::VarPositional).kind().is_injected());
        assert!(!Param::new("id").kind().is_injected());
    }

    #[test]
    fn test_marker_accessor() {
        let param = Param::new("q").located(query().build().unwrap());
        assert!(param.marker().is_some());
        assert!(Param::new("q").defaulted(3).marker().is_none());
    }
}
