//! Raw request data and bound argument values.

use bytes::Bytes;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ArgumentError;
use crate::location::Location;

/// A file received in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file.
    pub fn new(
        field_name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name,
            content_type,
            data,
        }
    }

    /// Form field the file was sent under.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Client-supplied file name.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Declared content type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty upload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn describe(&self) -> Value {
        let mut map = Map::new();
        map.insert("filename".into(), self.file_name.clone().map_or(Value::Null, Value::String));
        map.insert(
            "content_type".into(),
            self.content_type.clone().map_or(Value::Null, Value::String),
        );
        map.insert("size".into(), Value::from(self.data.len()));
        Value::Object(map)
    }
}

/// One extracted value before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A scalar or structured JSON value. Text sources produce strings.
    Json(Value),
    /// An uploaded file.
    File(UploadedFile),
    /// A key that occurred more than once.
    Many(Vec<RawValue>),
}

impl RawValue {
    /// A text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Json(Value::String(value.into()))
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Flat name to value map for one location.
pub type RawData = IndexMap<String, RawValue>;

/// The request payload after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// A JSON object or a form.
    Object(RawData),
    /// JSON that is not an object.
    Other(Value),
    /// A payload that could not be parsed, with the parser's message.
    Malformed(String),
}

impl RawBody {
    /// Wraps a parsed JSON document.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::Json(v)))
                    .collect(),
            ),
            other => Self::Other(other),
        }
    }
}

/// Raw data for every location a handler binds from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLocations {
    path: Option<RawData>,
    query: Option<RawData>,
    header: Option<RawData>,
    cookie: Option<RawData>,
    body: Option<RawBody>,
}

impl RawLocations {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores data for a location. Body data is stored as an object body.
    pub fn set(&mut self, location: Location, data: RawData) {
        match location {
            Location::Path => self.path = Some(data),
            Location::Query => self.query = Some(data),
            Location::Header => self.header = Some(data),
            Location::Cookie => self.cookie = Some(data),
            Location::Body => self.body = Some(RawBody::Object(data)),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, location: Location, data: RawData) -> Self {
        self.set(location, data);
        self
    }

    /// Stores the parsed body.
    pub fn set_body(&mut self, body: RawBody) {
        self.body = Some(body);
    }

    /// Data for a non-body location.
    pub fn get(&self, location: Location) -> Option<&RawData> {
        match location {
            Location::Path => self.path.as_ref(),
            Location::Query => self.query.as_ref(),
            Location::Header => self.header.as_ref(),
            Location::Cookie => self.cookie.as_ref(),
            Location::Body => match &self.body {
                Some(RawBody::Object(data)) => Some(data),
                _ => None,
            },
        }
    }

    /// The parsed body.
    pub fn body(&self) -> Option<&RawBody> {
        self.body.as_ref()
    }
}

/// A validated value.
///
/// Pure JSON results are kept as [`BoundValue::Json`]; `List` and
/// `Object` only appear when files are nested inside.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// Plain JSON.
    Json(Value),
    /// An uploaded file.
    File(UploadedFile),
    /// A list containing files.
    List(Vec<BoundValue>),
    /// An object containing files.
    Object(IndexMap<String, BoundValue>),
}

impl BoundValue {
    /// Builds a list, collapsing to JSON when no files are present.
    pub fn list(items: Vec<BoundValue>) -> Self {
        if items.iter().all(|v| matches!(v, Self::Json(_))) {
            Self::Json(Value::Array(items.into_iter().map(Self::into_json).collect()))
        } else {
            Self::List(items)
        }
    }

    /// Builds an object, collapsing to JSON when no files are present.
    pub fn object(fields: IndexMap<String, BoundValue>) -> Self {
        if fields.values().all(|v| matches!(v, Self::Json(_))) {
            Self::Json(Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into_json())).collect(),
            ))
        } else {
            Self::Object(fields)
        }
    }

    pub(crate) fn from_raw(raw: &RawValue) -> Self {
        match raw {
            RawValue::Json(v) => Self::Json(v.clone()),
            RawValue::File(f) => Self::File(f.clone()),
            RawValue::Many(items) => Self::list(items.iter().map(Self::from_raw).collect()),
        }
    }

    /// JSON rendering; files become `{filename, content_type, size}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(v) => v.clone(),
            Self::File(f) => f.describe(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    fn into_json(self) -> Value {
        match self {
            Self::Json(v) => v,
            other => other.to_json(),
        }
    }

    /// The file, if this is one.
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }
}

/// Keyword arguments produced by binding, in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: IndexMap<String, BoundValue>,
}

impl BoundArgs {
    /// Creates an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw bound value.
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    /// Deserializes an argument into `T`.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing, is a bare file, or does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.values.get(name).ok_or_else(|| ArgumentError::Missing {
            name: name.to_string(),
        })?;
        if matches!(value, BoundValue::File(_)) {
            return Err(ArgumentError::File {
                name: name.to_string(),
            });
        }
        serde_json::from_value(value.to_json()).map_err(|source| ArgumentError::Deserialize {
            name: name.to_string(),
            source,
        })
    }

    /// The uploaded file bound under `name`.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.values.get(name).and_then(BoundValue::as_file)
    }

    /// Returns true if `name` was bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates arguments in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON object of all arguments.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}
