//! End-to-end document generation over analyzed handlers.

use http::{Method, StatusCode};
use serde_json::json;
use signet_core::{
    body, cookie, header, path, query, CompositeSchema, CompositeType, FieldSpec, FieldType,
    Function, Handler, MethodSet, Param, ResponseDoc, SchemaRegistry,
};
use signet_docs::{describe, OpenApiGenerator, ParameterIn};

struct Page;

impl CompositeType for Page {
    fn composite_schema() -> CompositeSchema {
        CompositeSchema::builder("QueryPage")
            .field(
                FieldSpec::new("size", FieldType::Integer)
                    .alias("page-size")
                    .default_value(10),
            )
            .field(
                FieldSpec::new("num", FieldType::Integer)
                    .alias("page-num")
                    .default_value(1),
            )
            .build()
    }
}

struct Item;

impl CompositeType for Item {
    fn composite_schema() -> CompositeSchema {
        CompositeSchema::builder("Item")
            .description("A stored item")
            .field(FieldSpec::new("name", FieldType::String))
            .field(FieldSpec::new("price", FieldType::Number).default_value(0.0))
            .build()
    }
}

fn get_item() -> Function<()> {
    Function::new("get_item", ())
        .with_doc("Fetch an item.\n\nReturns the stored item by id.")
        .param(
            Param::new("id")
                .annotated(FieldType::Integer)
                .located(path().description("item id").build().unwrap()),
        )
        .param(
            Param::new("full")
                .annotated(FieldType::Boolean)
                .located(query().default_value(false).build().unwrap()),
        )
        .param(
            Param::new("x_token")
                .annotated(FieldType::String)
                .located(header().alias("x-token").build().unwrap()),
        )
        .param(
            Param::new("session")
                .annotated(FieldType::optional(FieldType::String))
                .located(cookie().default_value(serde_json::Value::Null).build().unwrap()),
        )
        .allow_methods([Method::GET])
}

fn analyzed(handlers: &[&Handler<()>]) -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    for handler in handlers {
        registry.analyze(handler).unwrap();
    }
    registry
}

#[test]
fn test_parameters_and_default_responses() {
    let handler: Handler<()> = get_item().into();
    let registry = analyzed(&[&handler]);

    let doc = OpenApiGenerator::new("Items", "1.0.0")
        .generate([("/item/{id}", &handler)], &registry)
        .unwrap();
    let op = doc.operation("/item/{id}", "get").unwrap();

    assert_eq!(op.operation_id, "get_item");
    assert_eq!(op.summary.as_deref(), Some("Fetch an item."));
    assert_eq!(op.description.as_deref(), Some("Returns the stored item by id."));

    let names: Vec<_> = op
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location, p.required))
        .collect();
    assert_eq!(
        names,
        vec![
            ("id", ParameterIn::Path, true),
            ("full", ParameterIn::Query, false),
            ("x-token", ParameterIn::Header, true),
            ("session", ParameterIn::Cookie, false),
        ]
    );
    assert_eq!(op.parameters[0].description.as_deref(), Some("item id"));
    assert!(op.parameters[3].schema.nullable);

    assert_eq!(op.responses["200"].description, "OK");
    let unprocessable = &op.responses["422"];
    assert_eq!(unprocessable.description, "Unprocessable Entity");
    assert_eq!(
        unprocessable.content.as_ref().unwrap()["application/json"]["schema"]["items"]["required"],
        json!(["loc", "type", "msg"])
    );
}

#[test]
fn test_exclusive_query_expands_fields() {
    let handler: Handler<()> = Function::new("list_items", ())
        .param(
            Param::new("page")
                .composite::<Page>()
                .located(query().exclusive().build().unwrap()),
        )
        .allow_methods([Method::GET])
        .into();
    let registry = analyzed(&[&handler]);

    let fragment = describe(&handler, &registry).unwrap();
    let op = fragment.item.get("get").unwrap();
    let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["page-size", "page-num"]);
    assert_eq!(op.parameters[0].schema.default, Some(json!(10)));
    assert!(!op.parameters[0].required);
}

#[test]
fn test_adopted_body_published_in_definitions() {
    let handler: Handler<()> = Function::new("create_item", ())
        .param(
            Param::new("item")
                .composite::<Item>()
                .located(body().exclusive().build().unwrap()),
        )
        .allow_methods([Method::POST])
        .describe_response(
            StatusCode::CREATED,
            ResponseDoc::new("").schema(Item::composite_schema()),
        )
        .into();
    let registry = analyzed(&[&handler]);

    let doc = OpenApiGenerator::new("Items", "1.0.0")
        .generate([("/items", &handler)], &registry)
        .unwrap();
    let op = doc.operation("/items", "post").unwrap();

    let body = op.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(
        body.content["application/json"].schema.reference.as_deref(),
        Some("#/definitions/Item")
    );
    assert_eq!(
        doc.definitions["Item"].description.as_deref(),
        Some("A stored item")
    );

    assert_eq!(op.responses["201"].description, "Created");
    assert!(!op.responses.contains_key("200"));
    assert!(op.responses.contains_key("422"));
}

#[test]
fn test_file_body_uses_multipart() {
    let handler: Handler<()> = Function::new("upload", ())
        .param(
            Param::new("upload")
                .annotated(FieldType::File)
                .located(body().build().unwrap()),
        )
        .allow_methods([Method::POST])
        .into();
    let registry = analyzed(&[&handler]);

    let fragment = describe(&handler, &registry).unwrap();
    let body = fragment.item.post.unwrap().request_body.unwrap();
    let schema = &body.content["multipart/form-data"].schema;
    assert_eq!(
        schema.properties["upload"].format.as_deref(),
        Some("binary")
    );
}

#[test]
fn test_user_described_422_wins() {
    let handler: Handler<()> = get_item()
        .describe_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ResponseDoc::new("Bad item query"),
        )
        .into();
    let registry = analyzed(&[&handler]);

    let fragment = describe(&handler, &registry).unwrap();
    let op = fragment.item.get.unwrap();
    assert_eq!(op.responses["422"].description, "Bad item query");
    assert!(op.responses["422"].content.is_none());
}

#[test]
fn test_method_set_operations_and_tags() {
    let set = MethodSet::new("items")
        .get(Function::new("list", ()).with_doc("List items"))
        .post(Function::new("create", ()))
        .mark_tags(["items"])
        .describe_extra_docs(json!({"x-owner": "catalog", "tags": ["public"]}));
    let handler: Handler<()> = set.into();
    let registry = analyzed(&[&handler]);

    let doc = OpenApiGenerator::new("Items", "1.0.0")
        .generate([("/items", &handler)], &registry)
        .unwrap();

    let get = doc.operation("/items", "get").unwrap();
    assert_eq!(get.operation_id, "items_get");
    assert_eq!(get.tags, vec!["items".to_string(), "public".to_string()]);
    assert_eq!(get.extensions["x-owner"], json!("catalog"));
    assert!(!get.responses.contains_key("422"));

    let post = doc.operation("/items", "post").unwrap();
    assert_eq!(post.operation_id, "items_post");
    assert!(doc.paths["/items"].get("options").is_none());
}

#[test]
fn test_function_without_methods_is_omitted() {
    let handler: Handler<()> = Function::new("orphan", ())
        .param(
            Param::new("id")
                .annotated(FieldType::Integer)
                .located(path().build().unwrap()),
        )
        .into();
    let listed: Handler<()> = Function::new("health", ())
        .allow_methods([Method::GET])
        .into();
    let registry = analyzed(&[&handler, &listed]);

    let doc = OpenApiGenerator::new("Items", "1.0.0")
        .generate([("/orphan/{id}", &handler), ("/health", &listed)], &registry)
        .unwrap();

    assert!(!doc.paths.contains_key("/orphan/{id}"));
    assert!(doc.paths.contains_key("/health"));
}

#[test]
fn test_unanalyzed_handler_documented_without_parameters() {
    let handler: Handler<()> = get_item().into();
    let registry = SchemaRegistry::new();

    let fragment = describe(&handler, &registry).unwrap();
    let op = fragment.item.get.unwrap();
    assert!(op.parameters.is_empty());
    assert!(!op.responses.contains_key("422"));
    assert!(registry.is_empty());
}

#[test]
fn test_unaliased_header_documented_with_hyphens() {
    let handler: Handler<()> = Function::new("whoami", ())
        .param(
            Param::new("x_token")
                .annotated(FieldType::String)
                .located(header().build().unwrap()),
        )
        .allow_methods([Method::GET])
        .into();
    let registry = analyzed(&[&handler]);

    let doc = OpenApiGenerator::new("Items", "1.0.0")
        .generate([("/whoami", &handler)], &registry)
        .unwrap();
    let op = doc.operation("/whoami", "get").unwrap();

    assert_eq!(op.parameters.len(), 1);
    assert_eq!(op.parameters[0].name, "x-token");
    assert_eq!(op.parameters[0].location, ParameterIn::Header);
}

#[test]
fn test_function_allowing_options_documents_other_methods_only() {
    let handler: Handler<()> = Function::new("ping", ())
        .allow_methods([Method::OPTIONS, Method::GET])
        .into();
    let registry = analyzed(&[&handler]);

    let fragment = describe(&handler, &registry).unwrap();
    let op = fragment.item.get.unwrap();
    assert_eq!(op.operation_id, "ping");
    assert!(fragment.item.head.is_none());
}

#[test]
fn test_generate_json_is_valid() {
    let handler: Handler<()> = get_item().into();
    let registry = analyzed(&[&handler]);

    let json = OpenApiGenerator::new("Items", "1.0.0")
        .generate_json([("/item/{id}", &handler)], &registry)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["openapi"], json!("3.0.0"));
    assert!(value["definitions"].is_object());
    assert_eq!(
        value["paths"]["/item/{id}"]["get"]["parameters"][0]["in"],
        json!("path")
    );
}
