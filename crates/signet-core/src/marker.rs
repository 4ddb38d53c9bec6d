//! Location markers.
//!
//! A [`ParameterMarker`] tags a handler parameter with the request
//! location its value comes from. Markers are plain values; the only rule
//! they enforce is that an exclusive marker carries nothing else.

use serde_json::Value;

use crate::error::DeclarationError;
use crate::location::Location;
use crate::schema::{Constraints, FieldDefault};

/// Declares where a parameter is read from and how it is described.
#[derive(Debug, Clone)]
pub struct ParameterMarker {
    location: Location,
    exclusive: bool,
    default: FieldDefault,
    alias: Option<String>,
    title: Option<String>,
    description: Option<String>,
    constraints: Constraints,
}

impl ParameterMarker {
    /// Location the parameter is bound from.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns true when the whole location binds into this parameter.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Default state of the field.
    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    /// Lookup alias.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Documentation title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Documentation description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validation constraints.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}

/// Builder for [`ParameterMarker`].
///
/// ```rust
/// use signet_core::{query, Location};
///
/// let marker = query().alias("page-size").default_value(10).ge(1.0).build().unwrap();
/// assert_eq!(marker.location(), Location::Query);
/// assert_eq!(marker.alias(), Some("page-size"));
///
/// assert!(query().exclusive().title("Paging").build().is_err());
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MarkerBuilder {
    location: Location,
    exclusive: bool,
    default: FieldDefault,
    alias: Option<String>,
    title: Option<String>,
    description: Option<String>,
    constraints: Constraints,
    pattern: Option<String>,
}

impl MarkerBuilder {
    /// Starts a marker for `location`.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            exclusive: false,
            default: FieldDefault::Required,
            alias: None,
            title: None,
            description: None,
            constraints: Constraints::default(),
            pattern: None,
        }
    }

    /// Binds the whole location into one composite parameter.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Value used when the request omits the field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Reads the field from `alias` instead of the parameter name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Documentation title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value must be `>= bound`.
    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    /// Value must be `> bound`.
    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    /// Value must be `<= bound`.
    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    /// Value must be `< bound`.
    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    /// Minimum string length or item count.
    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Maximum string length or item count.
    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Regex the value must match.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    fn has_attributes(&self) -> bool {
        !matches!(self.default, FieldDefault::Required)
            || self.alias.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.pattern.is_some()
            || !self.constraints.is_empty()
    }

    /// Finishes the marker.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::ExclusiveWithAttributes`] when `exclusive` is
    /// combined with anything else, [`DeclarationError::InvalidPattern`]
    /// when the pattern does not compile.
    pub fn build(self) -> Result<ParameterMarker, DeclarationError> {
        if self.exclusive && self.has_attributes() {
            return Err(DeclarationError::ExclusiveWithAttributes {
                location: self.location,
            });
        }
        let constraints = match &self.pattern {
            Some(pattern) => self.constraints.with_pattern(pattern)?,
            None => self.constraints,
        };
        Ok(ParameterMarker {
            location: self.location,
            exclusive: self.exclusive,
            default: self.default,
            alias: self.alias,
            title: self.title,
            description: self.description,
            constraints,
        })
    }
}

/// Marker for a route-matched path parameter.
pub fn path() -> MarkerBuilder {
    MarkerBuilder::new(Location::Path)
}

/// Marker for a query string parameter.
pub fn query() -> MarkerBuilder {
    MarkerBuilder::new(Location::Query)
}

/// Marker for a request header.
pub fn header() -> MarkerBuilder {
    MarkerBuilder::new(Location::Header)
}

/// Marker for a cookie.
pub fn cookie() -> MarkerBuilder {
    MarkerBuilder::new(Location::Cookie)
}

/// Marker for a body field.
pub fn body() -> MarkerBuilder {
    MarkerBuilder::new(Location::Body)
}
