//! OpenAPI document types.
//!
//! The document follows OpenAPI 3.0 with one addition: reusable composite
//! schemas live under a top-level `definitions` map and are referenced as
//! `#/definitions/<Name>`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OpenAPI version emitted by the generator.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// API paths and operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Composite schemas referenced from operations.
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,
}

impl OpenApi {
    /// Looks up an operation by path and lowercase method name.
    #[must_use]
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &str) -> Option<&mut Option<Operation>> {
        match method {
            "get" => Some(&mut self.get),
            "put" => Some(&mut self.put),
            "post" => Some(&mut self.post),
            "delete" => Some(&mut self.delete),
            "head" => Some(&mut self.head),
            "patch" => Some(&mut self.patch),
            "trace" => Some(&mut self.trace),
            _ => None,
        }
    }

    /// Stores an operation under a lowercase method name.
    ///
    /// Returns the operation back when the method has no slot (`options`,
    /// `connect`, extension methods).
    pub fn set(&mut self, method: &str, operation: Operation) -> Result<(), Operation> {
        match self.slot(method) {
            Some(slot) => {
                *slot = Some(operation);
                Ok(())
            }
            None => Err(operation),
        }
    }

    /// Returns the operation for a lowercase method name.
    #[must_use]
    pub fn get(&self, method: &str) -> Option<&Operation> {
        match method {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }

    /// Copies every operation of `other` into this item.
    pub fn merge(&mut self, other: Self) {
        for (method, operation) in [
            ("get", other.get),
            ("put", other.put),
            ("post", other.post),
            ("delete", other.delete),
            ("head", other.head),
            ("patch", other.patch),
            ("trace", other.trace),
        ] {
            if let Some(operation) = operation {
                let _ = self.set(method, operation);
            }
        }
    }

    /// Returns true when no operation is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.get.is_none()
            && self.put.is_none()
            && self.post.is_none()
            && self.delete.is_none()
            && self.head.is_none()
            && self.patch.is_none()
            && self.trace.is_none()
    }
}

/// An API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, Response>,
    /// Free-form fields contributed by handler metadata.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    pub schema: Schema,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    pub schema: Schema,
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    /// Response links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Response {
    /// A response with only a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
            headers: None,
            links: None,
        }
    }
}

/// JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
}

/// JSON Schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Schema format (e.g. "binary").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to another schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// allOf schemas, used to annotate a reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "allOf")]
    pub all_of: Vec<Schema>,
    /// Minimum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Whether `minimum` is exclusive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    #[serde(rename = "exclusiveMinimum")]
    pub exclusive_minimum: bool,
    /// Maximum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Whether `maximum` is exclusive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    #[serde(rename = "exclusiveMaximum")]
    pub exclusive_maximum: bool,
    /// Minimum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    /// Maximum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    /// Minimum item count (for arrays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minItems")]
    pub min_items: Option<u64>,
    /// Maximum item count (for arrays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxItems")]
    pub max_items: Option<u64>,
    /// Pattern regex (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether nullable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl Schema {
    /// Create a schema of the given type.
    #[must_use]
    pub fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Create a reference into `definitions`.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{name}")),
            ..Default::default()
        }
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Returns true for an array schema.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.schema_type == Some(SchemaType::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_reference() {
        let schema = Schema::reference("Page");
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json, json!({"$ref": "#/definitions/Page"}));
    }

    #[test]
    fn test_schema_serialization_skips_empty() {
        let schema = Schema::array(Schema::typed(SchemaType::String)).with_description("tags");
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            json!({"type": "array", "description": "tags", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_parameter_in_serialization() {
        let json = serde_json::to_value(ParameterIn::Cookie).unwrap();
        assert_eq!(json, json!("cookie"));
    }

    #[test]
    fn test_path_item_set_and_merge() {
        let mut item = PathItem::default();
        let op = Operation {
            operation_id: "list".to_string(),
            ..Default::default()
        };
        assert!(item.set("get", op.clone()).is_ok());
        assert!(item.set("options", op.clone()).is_err());

        let mut other = PathItem::default();
        other.post = Some(op);
        item.merge(other);

        assert!(item.get("get").is_some());
        assert!(item.get("post").is_some());
        assert!(!item.is_empty());
    }

    #[test]
    fn test_operation_extensions_flatten() {
        let mut op = Operation {
            operation_id: "get_item".to_string(),
            tags: vec!["items".to_string()],
            ..Default::default()
        };
        op.extensions.insert("x-internal".to_string(), json!(true));
        op.responses
            .insert("200".to_string(), Response::new("OK"));

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["x-internal"], json!(true));
        assert_eq!(json["operationId"], json!("get_item"));
        assert_eq!(json["responses"]["200"]["description"], json!("OK"));

        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }
}
