//! Conversion of composite schemas and fields into JSON Schema.

use indexmap::IndexMap;
use signet_core::{CompositeSchema, FieldDefault, FieldSpec, FieldType};

use crate::openapi::{Schema, SchemaType};

/// Composite schemas published under `definitions`, by name.
pub type Definitions = IndexMap<String, Schema>;

/// Turns `page_size` or `x-token` into `Page Size` / `X Token`.
pub(crate) fn title_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Publishes a composite schema under `definitions` and returns a reference.
pub fn definition_ref(schema: &CompositeSchema, definitions: &mut Definitions) -> Schema {
    if !definitions.contains_key(schema.name()) {
        // Placeholder first so self-referencing schemas terminate.
        definitions.insert(schema.name().to_string(), Schema::default());
        let object = object_schema(schema, definitions);
        definitions.insert(schema.name().to_string(), object);
    }
    Schema::reference(schema.name())
}

/// Expands a composite schema into an inline object schema.
pub fn object_schema(schema: &CompositeSchema, definitions: &mut Definitions) -> Schema {
    let mut object = Schema::typed(SchemaType::Object);
    object.title = Some(
        schema
            .title()
            .map_or_else(|| title_case(schema.name()), ToOwned::to_owned),
    );
    object.description = schema.description().map(ToOwned::to_owned);
    for field in schema.fields() {
        object
            .properties
            .insert(field.lookup_key().to_string(), field_schema(field, definitions));
        if field.is_required() {
            object.required.push(field.lookup_key().to_string());
        }
    }
    object
}

fn type_schema(ty: &FieldType, definitions: &mut Definitions) -> Schema {
    match ty {
        FieldType::Any => Schema::default(),
        FieldType::String => Schema::typed(SchemaType::String),
        FieldType::Integer => Schema::typed(SchemaType::Integer),
        FieldType::Number => Schema::typed(SchemaType::Number),
        FieldType::Boolean => Schema::typed(SchemaType::Boolean),
        FieldType::File => Schema {
            format: Some("binary".to_string()),
            ..Schema::typed(SchemaType::String)
        },
        FieldType::Array(inner) => Schema::array(type_schema(inner, definitions)),
        FieldType::Optional(inner) => {
            let inner = type_schema(inner, definitions);
            if inner.reference.is_some() {
                Schema {
                    all_of: vec![inner],
                    nullable: true,
                    ..Schema::default()
                }
            } else {
                Schema {
                    nullable: true,
                    ..inner
                }
            }
        }
        FieldType::Object(schema) => definition_ref(schema, definitions),
    }
}

/// JSON Schema for one field, with title, default and constraints.
pub fn field_schema(field: &FieldSpec, definitions: &mut Definitions) -> Schema {
    let mut schema = type_schema(field.ty(), definitions);
    if schema.reference.is_some() {
        schema = Schema {
            all_of: vec![schema],
            ..Schema::default()
        };
    }

    schema.title = Some(
        field
            .title_text()
            .map_or_else(|| title_case(field.name()), ToOwned::to_owned),
    );
    schema.description = field.description_text().map(ToOwned::to_owned);
    if let FieldDefault::Value(value) = field.default() {
        schema.default = Some(value.clone());
    }

    let constraints = field.constraint_set();
    if let Some(ge) = constraints.ge {
        schema.minimum = Some(ge);
    }
    if let Some(gt) = constraints.gt {
        schema.minimum = Some(gt);
        schema.exclusive_minimum = true;
    }
    if let Some(le) = constraints.le {
        schema.maximum = Some(le);
    }
    if let Some(lt) = constraints.lt {
        schema.maximum = Some(lt);
        schema.exclusive_maximum = true;
    }
    let min = constraints.min_length.map(|n| n as u64);
    let max = constraints.max_length.map(|n| n as u64);
    if schema.is_array() {
        schema.min_items = min;
        schema.max_items = max;
    } else {
        schema.min_length = min;
        schema.max_length = max;
    }
    schema.pattern = constraints.pattern.as_ref().map(|re| re.as_str().to_string());

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use signet_core::{CompositeType, Constraints};

    struct Page;

    impl CompositeType for Page {
        fn composite_schema() -> CompositeSchema {
            CompositeSchema::builder("Page")
                .field(
                    FieldSpec::new("size", FieldType::Integer)
                        .alias("page-size")
                        .default_value(10),
                )
                .field(FieldSpec::new("cursor", FieldType::String))
                .build()
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("page_size"), "Page Size");
        assert_eq!(title_case("x-token"), "X Token");
        assert_eq!(title_case("id"), "Id");
    }

    #[test]
    fn test_field_schema_constraints() {
        let constraints = Constraints {
            gt: Some(0.0),
            le: Some(100.0),
            ..Constraints::default()
        };
        let field = FieldSpec::new("limit", FieldType::Integer)
            .default_value(20)
            .description("page length")
            .constraints(constraints);

        let json = serde_json::to_value(field_schema(&field, &mut Definitions::new())).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "integer",
                "title": "Limit",
                "description": "page length",
                "minimum": 0.0,
                "exclusiveMinimum": true,
                "maximum": 100.0,
                "default": 20
            })
        );
    }

    #[test]
    fn test_array_length_constraints_become_items() {
        let constraints = Constraints {
            min_length: Some(1),
            ..Constraints::default()
        };
        let field =
            FieldSpec::new("tags", FieldType::array(FieldType::String)).constraints(constraints);
        let schema = field_schema(&field, &mut Definitions::new());
        assert_eq!(schema.min_items, Some(1));
        assert_eq!(schema.min_length, None);
    }

    #[test]
    fn test_file_and_optional() {
        let defs = &mut Definitions::new();
        let file = field_schema(&FieldSpec::new("upload", FieldType::File), defs);
        assert_eq!(file.format.as_deref(), Some("binary"));

        let optional = field_schema(
            &FieldSpec::new("note", FieldType::optional(FieldType::String)),
            defs,
        );
        assert!(optional.nullable);
        assert_eq!(optional.schema_type, Some(SchemaType::String));
    }

    #[test]
    fn test_nested_object_published_once() {
        let defs = &mut Definitions::new();
        let field = FieldSpec::new("page", FieldType::object::<Page>());
        let first = field_schema(&field, defs);
        let _ = field_schema(&field, defs);

        assert_eq!(defs.len(), 1);
        assert_eq!(
            first.all_of[0].reference.as_deref(),
            Some("#/definitions/Page")
        );

        let page = &defs["Page"];
        assert!(page.properties.contains_key("page-size"));
        assert_eq!(page.required, vec!["cursor".to_string()]);
        assert_eq!(page.properties["page-size"].default, Some(json!(10)));
    }
}
