//! Per-handler schema bundles.

use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::location::Location;
use crate::schema::{CompositeSchema, SchemaId};
use crate::value::{BoundArgs, RawLocations};

/// Maps adopted schemas to the parameter their whole object binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusiveBindingMap {
    inner: IndexMap<SchemaId, String>,
}

impl ExclusiveBindingMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `schema` binds to `param`.
    pub fn insert(&mut self, schema: SchemaId, param: impl Into<String>) {
        self.inner.insert(schema, param.into());
    }

    /// Parameter name for `schema`.
    pub fn get(&self, schema: SchemaId) -> Option<&str> {
        self.inner.get(&schema).map(String::as_str)
    }

    /// Number of exclusive bindings.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true when nothing binds exclusively.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates `(schema, parameter)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &str)> {
        self.inner.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

/// Every schema a handler binds from, by location.
///
/// Built once per handler and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaBundle {
    parameters: IndexMap<Location, CompositeSchema>,
    request_body: Option<CompositeSchema>,
    exclusive: ExclusiveBindingMap,
}

impl SchemaBundle {
    pub(crate) fn new(
        parameters: IndexMap<Location, CompositeSchema>,
        request_body: Option<CompositeSchema>,
        exclusive: ExclusiveBindingMap,
    ) -> Self {
        Self {
            parameters,
            request_body,
            exclusive,
        }
    }

    /// Schema for `location`.
    pub fn schema(&self, location: Location) -> Option<&CompositeSchema> {
        match location {
            Location::Body => self.request_body.as_ref(),
            other => self.parameters.get(&other),
        }
    }

    /// Path, query, header and cookie schemas in binding order.
    pub fn parameters(&self) -> impl Iterator<Item = (Location, &CompositeSchema)> {
        self.parameters.iter().map(|(location, schema)| (*location, schema))
    }

    /// The body schema.
    pub fn request_body(&self) -> Option<&CompositeSchema> {
        self.request_body.as_ref()
    }

    /// Exclusive binding map.
    pub fn exclusive_bindings(&self) -> &ExclusiveBindingMap {
        &self.exclusive
    }

    /// Locations with a schema, in binding order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        Location::ALL
            .into_iter()
            .filter(|location| self.schema(*location).is_some())
    }

    /// Returns true when the handler binds nothing.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.request_body.is_none()
    }

    /// Validates raw request data and produces keyword arguments.
    ///
    /// # Errors
    ///
    /// Every failure of every location, in one error.
    pub fn bind(&self, raw: &RawLocations) -> Result<BoundArgs, ValidationError> {
        crate::bind::bind(self, raw)
    }
}
