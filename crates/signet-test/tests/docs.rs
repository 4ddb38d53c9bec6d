//! Method sets and the served OpenAPI document.

use http::{Method, StatusCode};
use serde_json::json;
use signet::prelude::*;
use signet_test::TestClient;

fn items() -> MethodSet<Endpoint> {
    let list = sync_function("list", |_ctx, args| Ok(args.to_json())).param(
        Param::new("limit")
            .annotated(FieldType::Integer)
            .located(query().default_value(20).le(100.0).build().unwrap()),
    );
    let create = sync_function("create", |_ctx, args| {
        Ok(JsonResponse::created(args.to_json()))
    })
    .with_doc("Create an item.\n\nThe name must be unique.")
    .param(
        Param::new("name")
            .annotated(FieldType::String)
            .located(body().build().unwrap()),
    )
    .describe_response(StatusCode::CREATED, ResponseDoc::new(""));

    MethodSet::new("items").get(list).post(create).mark_tags(["items"])
}

fn app() -> App {
    AppBuilder::new()
        .route("/items", items())
        .docs("/openapi.json", OpenApiGenerator::new("Inventory", "1.2.0"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_method_set_dispatch() {
    let client = TestClient::new(app());

    client
        .get("/items?limit=5")
        .send()
        .await
        .assert_json_eq(&json!({ "limit": 5 }));
    client
        .post("/items")
        .json(&json!({ "name": "bolt" }))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    let response = client.delete("/items").send().await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.allowed_methods(), vec!["GET", "POST", "OPTIONS"]);
}

#[tokio::test]
async fn test_automatic_options() {
    let client = TestClient::new(app());

    let response = client.options("/items").send().await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(response.allowed_methods(), vec!["GET", "POST", "OPTIONS"]);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_served_document() {
    let client = TestClient::new(app());

    let response = client.get("/openapi.json").send().await;
    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "application/json")
        .assert_json_field("openapi", &json!("3.0.0"))
        .assert_json_field("info.title", &json!("Inventory"))
        .assert_json_field("paths./items.get.operationId", &json!("items_get"))
        .assert_json_field("paths./items.get.parameters.0.name", &json!("limit"))
        .assert_json_field("paths./items.get.parameters.0.schema.maximum", &json!(100.0))
        .assert_json_field("paths./items.post.summary", &json!("Create an item."))
        .assert_json_field("paths./items.post.responses.201.description", &json!("Created"))
        .assert_json_field("paths./items.post.tags", &json!(["items"]));

    let doc = response.json_value().unwrap();
    assert!(doc["paths"]["/items"].get("options").is_none());
    assert!(doc["paths"]["/items"]["get"]["responses"]["422"].is_object());

    client
        .request(Method::HEAD, "/openapi.json")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_documented_header_name_is_accepted() -> anyhow::Result<()> {
    let whoami = sync_function("whoami", |_ctx, args| Ok(args.to_json()))
        .param(
            Param::new("x_token")
                .annotated(FieldType::String)
                .located(header().build()?),
        )
        .allow_methods([Method::GET]);
    let client = TestClient::new(
        AppBuilder::new()
            .route("/whoami", whoami)
            .docs("/openapi.json", OpenApiGenerator::new("Inventory", "1.2.0"))
            .build()?,
    );

    let doc = client.get("/openapi.json").send().await.json_value()?;
    let name = doc["paths"]["/whoami"]["get"]["parameters"][0]["name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert_eq!(name, "x-token");

    client
        .get("/whoami")
        .header(&name, "t")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({ "x_token": "t" }));
    client
        .get("/whoami")
        .header("x_token", "t")
        .send()
        .await
        .assert_validation_locs(&[&["x-token"]]);
    Ok(())
}

#[tokio::test]
async fn test_app_from_config() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_string(
            r#"
            [docs]
            path = "/spec.json"
            title = "Configured"

            [extraction]
            header_values = "join"
            max_body_size = 64
            "#,
            "toml",
        )?
        .load()?;

    let tagged = sync_function("tagged", |_ctx, args| Ok(args.to_json()))
        .param(Param::new("x_tag").located(header().build()?));
    let app = AppBuilder::from_config(&config).route("/tagged", tagged).build()?;
    let client = TestClient::new(app);

    client
        .get("/spec.json")
        .send()
        .await
        .assert_json_field("info.title", &json!("Configured"));
    client
        .get("/tagged")
        .header("X-Tag", "a")
        .header("X-Tag", "b")
        .send()
        .await
        .assert_json_eq(&json!({ "x_tag": "a, b" }));
    client.get("/openapi.json").send().await.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
