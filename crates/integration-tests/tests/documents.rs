//! Whole-document routes: `/api/metafield-by-handle` and
//! `/api/product-variants`.

use axum::http::StatusCode;
use branch_stock_integration_tests::{TestContext, product_gid};
use serde_json::{Value, json};

async fn mount_document(ctx: &TestContext, value: Option<&str>) {
    let metafield = value.map(|v| json!({ "value": v }));
    ctx.mount_operation(
        "ProductStockDocument",
        json!({ "productByIdentifier": {
            "id": product_gid(1),
            "handle": "cama-luton",
            "title": "Cama Luton",
            "metafield": metafield
        }}),
    )
    .await;
}

#[tokio::test]
async fn test_replace_with_object_value() {
    let ctx = TestContext::new().await;
    ctx.mount_product(1, "cama-luton").await;
    ctx.mount_set_ok().await;

    let document = json!([{ "name": "Web", "quantity": 3 }]);
    let (status, body) = ctx
        .post(
            "/api/metafield-by-handle",
            json!({ "handle": "cama-luton", "value": document }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "gid": product_gid(1) }));

    let written = ctx.written_metafields().await;
    assert_eq!(written[0]["namespace"], "custom");
    assert_eq!(written[0]["key"], "sucursales");
    let stored: Value = serde_json::from_str(written[0]["value"].as_str().unwrap()).unwrap();
    assert_eq!(stored, document);
}

#[tokio::test]
async fn test_replace_with_string_value_is_stored_verbatim() {
    let ctx = TestContext::new().await;
    ctx.mount_product(1, "cama-luton").await;
    ctx.mount_set_ok().await;

    let raw = r#"{"sucursales":[{"nombre":"Web"}],"variantes":[]}"#;
    let (status, _) = ctx
        .post(
            "/api/metafield-by-handle",
            json!({ "handle": "cama-luton", "value": raw }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.written_metafields().await[0]["value"], raw);
}

#[tokio::test]
async fn test_replace_rejects_non_json_string() {
    let ctx = TestContext::new().await;
    ctx.mount_product(1, "cama-luton").await;
    ctx.mount_set_ok().await;

    let (status, body) = ctx
        .post(
            "/api/metafield-by-handle",
            json!({ "handle": "cama-luton", "value": "{no es json" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(ctx.written_metafields().await.is_empty());
}

#[tokio::test]
async fn test_replace_requires_handle_and_value() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post("/api/metafield-by-handle", json!({ "value": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("handle is required"));

    let (status, _) = ctx
        .post("/api/metafield-by-handle", json!({ "handle": "cama-luton" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_rejected_by_shopify_is_422() {
    let ctx = TestContext::new().await;
    ctx.mount_product(1, "cama-luton").await;
    ctx.mount_set_rejected("Value does not match the definition").await;

    let (status, body) = ctx
        .post(
            "/api/metafield-by-handle",
            json!({ "handle": "cama-luton", "value": { "a": 1 } }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Value does not match the definition");
}

#[tokio::test]
async fn test_replace_unknown_handle_is_404() {
    let ctx = TestContext::new().await;
    ctx.mount_no_product().await;

    let (status, body) = ctx
        .post(
            "/api/metafield-by-handle",
            json!({ "handle": "no-existe", "value": [] }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_product_variants_matrix() {
    let ctx = TestContext::new().await;
    mount_document(
        &ctx,
        Some(
            r#"{"sucursales":[{"nombre":"Web"},{"nombre":"Suc. Centro"}],
                "variantes":[
                  {"sku":"CL-KING","opciones":[{"nombre":"Tamaño","valor":"King"}],"cantidades":[3,"1"]},
                  {"sku":"CL-QUEEN","cantidades":[0,null]}
                ]}"#,
        ),
    )
    .await;

    let (status, body) = ctx.get("/api/product-variants?handle=cama-luton").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"], json!({ "handle": "cama-luton", "title": "Cama Luton" }));
    assert_eq!(body["sucursales"], json!(["Web", "Suc. Centro"]));
    assert_eq!(
        body["variants"][0],
        json!({ "sku": "CL-KING", "options": { "Tamaño": "King" }, "cantidades": [3, 1] })
    );
    assert_eq!(body["variants"][1]["cantidades"], json!([0, 0]));
}

#[tokio::test]
async fn test_product_variants_unset_metafield_is_400() {
    let ctx = TestContext::new().await;
    mount_document(&ctx, None).await;

    let (status, body) = ctx.get("/api/product-variants?handle=cama-luton").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("custom.sucursales"));
}

#[tokio::test]
async fn test_product_variants_invalid_json_is_400() {
    let ctx = TestContext::new().await;
    mount_document(&ctx, Some("{roto")).await;

    let (status, body) = ctx.get("/api/product-variants?handle=cama-luton").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid JSON"));
}

#[tokio::test]
async fn test_product_variants_unknown_handle_is_404() {
    let ctx = TestContext::new().await;
    ctx.mount_no_product().await;

    let (status, _) = ctx.get("/api/product-variants?handle=no-existe").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get("/api/product-variants").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
