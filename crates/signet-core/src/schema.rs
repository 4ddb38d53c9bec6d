//! Composite schema model.
//!
//! A [`CompositeSchema`] is an ordered set of named, typed fields. The
//! analyzer synthesizes one per location from per-field markers, or adopts
//! a user type's schema wholesale for exclusive markers.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::DeclarationError;
use crate::location::Location;

/// Whether a field must be present, or what it falls back to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldDefault {
    /// The field must be supplied.
    #[default]
    Required,
    /// Value used when the field is absent.
    Value(Value),
}

impl FieldDefault {
    /// Returns the default value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Required => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// Validation constraints applied after type coercion.
///
/// Numeric bounds apply to integers and numbers, lengths to strings
/// (characters) and arrays (items), `pattern` to strings.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Minimum length.
    pub min_length: Option<usize>,
    /// Maximum length.
    pub max_length: Option<usize>,
    /// Regex the string must match from its first character.
    pub pattern: Option<Regex>,
}

impl Constraints {
    /// Returns true when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.ge.is_none()
            && self.gt.is_none()
            && self.le.is_none()
            && self.lt.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }

    /// Compiles and sets `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, DeclarationError> {
        let regex = Regex::new(pattern).map_err(|e| DeclarationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }
}

/// The declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Anything, passed through untouched.
    Any,
    /// Text.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// Boolean.
    Boolean,
    /// Uploaded file from a multipart body.
    File,
    /// Homogeneous list.
    Array(Box<FieldType>),
    /// Nullable value of the inner type.
    Optional(Box<FieldType>),
    /// Nested composite object.
    Object(CompositeSchema),
}

impl FieldType {
    /// `Array(inner)`.
    pub fn array(inner: FieldType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// `Optional(inner)`.
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Nested object of a user composite type.
    pub fn object<T: CompositeType>() -> Self {
        Self::Object(T::composite_schema())
    }

    /// Returns true when this type, or any type it wraps, is a file.
    pub fn contains_file(&self) -> bool {
        match self {
            Self::File => true,
            Self::Array(inner) | Self::Optional(inner) => inner.contains_file(),
            _ => false,
        }
    }
}

/// One named field of a composite schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    default: FieldDefault,
    alias: Option<String>,
    title: Option<String>,
    description: Option<String>,
    constraints: Constraints,
}

impl FieldSpec {
    /// A required field.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: FieldDefault::Required,
            alias: None,
            title: None,
            description: None,
            constraints: Constraints::default(),
        }
    }

    /// Makes the field optional with a fallback value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Sets the full default state.
    #[must_use]
    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    /// Looks the field up under `alias` instead of its name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the documentation title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets validation constraints.
    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Field name, used as the bound argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Alias, if set.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Key the raw value is read from: the alias if set, else the name.
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Key the field is read from at `location`.
    ///
    /// Header fields without an alias are read from the name with
    /// underscores turned into hyphens; every other location uses
    /// [`lookup_key`](Self::lookup_key).
    pub fn key_at(&self, location: Location) -> Cow<'_, str> {
        match (location, self.alias.as_deref()) {
            (_, Some(alias)) => Cow::Borrowed(alias),
            (Location::Header, None) => Cow::Owned(self.name.replace('_', "-")),
            (_, None) => Cow::Borrowed(&self.name),
        }
    }

    /// Default state.
    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    /// Returns true when the field has no default.
    pub fn is_required(&self) -> bool {
        matches!(self.default, FieldDefault::Required)
    }

    /// Documentation title.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Documentation description.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validation constraints.
    pub fn constraint_set(&self) -> &Constraints {
        &self.constraints
    }
}

/// Process-unique identity of a composite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema#{}", self.0)
    }
}

/// Where a composite schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// Built by the analyzer from per-field markers; binds flattened.
    Synthesized,
    /// A user composite type; binds as one object.
    Adopted,
}

#[derive(Debug)]
struct SchemaInner {
    id: SchemaId,
    name: String,
    title: Option<String>,
    description: Option<String>,
    origin: SchemaOrigin,
    fields: Vec<FieldSpec>,
}

/// An ordered set of named, typed fields.
///
/// Clones share the same identity.
#[derive(Debug, Clone)]
pub struct CompositeSchema {
    inner: Arc<SchemaInner>,
}

impl CompositeSchema {
    /// Starts an adopted schema for a user composite type.
    pub fn builder(name: impl Into<String>) -> CompositeSchemaBuilder {
        CompositeSchemaBuilder {
            name: name.into(),
            title: None,
            description: None,
            fields: Vec::new(),
        }
    }

    pub(crate) fn synthesized(name: String, fields: Vec<FieldSpec>) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                id: SchemaId::next(),
                name,
                title: None,
                description: None,
                origin: SchemaOrigin::Synthesized,
                fields,
            }),
        }
    }

    /// Identity shared by all clones.
    pub fn id(&self) -> SchemaId {
        self.inner.id
    }

    /// Schema name; adopted schemas are published under it.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Documentation title.
    pub fn title(&self) -> Option<&str> {
        self.inner.title.as_deref()
    }

    /// Documentation description.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Origin of the schema.
    pub fn origin(&self) -> SchemaOrigin {
        self.inner.origin
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.inner.fields
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.inner.fields.iter().find(|f| f.name == name)
    }

    /// Returns true when the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Returns true when any field carries a file.
    pub fn has_file_fields(&self) -> bool {
        self.inner.fields.iter().any(|f| f.ty.contains_file())
    }
}

/// Builder for adopted schemas.
#[derive(Debug)]
#[must_use]
pub struct CompositeSchemaBuilder {
    name: String,
    title: Option<String>,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

impl CompositeSchemaBuilder {
    /// Sets the documentation title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> CompositeSchema {
        CompositeSchema {
            inner: Arc::new(SchemaInner {
                id: SchemaId::next(),
                name: self.name,
                title: self.title,
                description: self.description,
                origin: SchemaOrigin::Adopted,
                fields: self.fields,
            }),
        }
    }
}

/// A user type describable as a composite schema.
///
/// Exclusive markers require their parameter to be annotated with one of
/// these. The bound object can be turned back into `Self` with
/// [`BoundArgs::get`](crate::BoundArgs::get) when the type is also
/// `Deserialize`.
///
/// ```rust
/// use signet_core::{CompositeSchema, CompositeType, FieldSpec, FieldType};
///
/// struct Page;
///
/// impl CompositeType for Page {
///     fn composite_schema() -> CompositeSchema {
///         CompositeSchema::builder("Page")
///             .field(FieldSpec::new("size", FieldType::Integer).alias("page-size").default_value(10))
///             .field(FieldSpec::new("num", FieldType::Integer).alias("page-num").default_value(1))
///             .build()
///     }
/// }
///
/// assert_eq!(Page::composite_schema().fields().len(), 2);
/// ```
pub trait CompositeType {
    /// Describes the type's fields.
    fn composite_schema() -> CompositeSchema;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_identity_survives_clone() {
        let schema = CompositeSchema::builder("Item").build();
        let copy = schema.clone();
        assert_eq!(schema.id(), copy.id());
        assert_ne!(schema.id(), CompositeSchema::builder("Item").build().id());
    }

    #[test]
    fn test_field_lookup_key_prefers_alias() {
        let field = FieldSpec::new("size", FieldType::Integer).alias("page-size");
        assert_eq!(field.lookup_key(), "page-size");
        assert_eq!(FieldSpec::new("size", FieldType::Integer).lookup_key(), "size");
    }

    #[test]
    fn test_field_header_key_hyphenates_name() {
        let field = FieldSpec::new("x_token", FieldType::String);
        assert_eq!(field.key_at(Location::Header), "x-token");
        assert_eq!(field.key_at(Location::Query), "x_token");

        let aliased = FieldSpec::new("x_token", FieldType::String).alias("X_Raw");
        assert_eq!(aliased.key_at(Location::Header), "X_Raw");
    }

    #[test]
    fn test_field_required_by_default() {
        let field = FieldSpec::new("id", FieldType::Integer);
        assert!(field.is_required());
        assert!(!field.default_value(1).is_required());
    }

    #[test]
    fn test_contains_file() {
        assert!(FieldType::array(FieldType::File).contains_file());
        assert!(FieldType::optional(FieldType::File).contains_file());
        assert!(!FieldType::array(FieldType::String).contains_file());
    }

    #[test]
    fn test_constraints_pattern() {
        let constraints = Constraints::default().with_pattern("^[a-z]+$").unwrap();
        assert!(!constraints.is_empty());
        assert!(Constraints::default().with_pattern("(").is_err());
    }
}
