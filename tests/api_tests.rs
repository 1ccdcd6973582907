//! HTTP-level tests against the router with an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bundlecraft::api::{self, AppState};
use bundlecraft::publisher::EventPublisher;
use bundlecraft::{BundleService, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const SHOP: &str = "demo.myshopify.com";

fn app() -> axum::Router {
    let bundles = BundleService::new(Arc::new(MemoryStore::new()), EventPublisher::disabled(), "USD");
    api::router(AppState { bundles })
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())) };
    (status, value)
}

fn bundle_body() -> Value {
    json!({
        "title": "Morning Ritual",
        "discount_type": "percentage",
        "discount_value": "20",
        "components": [
            { "product_id": "gid://shopify/Product/1", "variant_id": "gid://shopify/ProductVariant/11", "product_title": "Beans", "price": "18.00", "quantity": 2 },
            { "product_id": "gid://shopify/Product/2", "variant_id": "gid://shopify/ProductVariant/21", "product_title": "Mug", "price": "14.00", "quantity": 1 }
        ]
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_bundle_lifecycle() {
    let app = app();
    let (status, created) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles"), Some(bundle_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "active");
    assert_eq!(created["original_price"]["amount"], "50.00");
    assert_eq!(created["bundle_price"]["amount"], "40.00");
    assert_eq!(created["savings"]["amount"], "10.00");
    assert_eq!(created["badge_text"], "Bundle & Save");

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Morning Ritual");

    let (status, _) = send(&app, "GET", &format!("/api/v1/shops/other.myshopify.com/bundles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, copy) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles/{id}/duplicate"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["status"], "draft");

    let (_, list) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles?status=draft"), None).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["stats"]["total"], 2);

    let (status, archived) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles/{id}/archive"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["status"], "archived");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/shops/{SHOP}/bundles/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/shops/{SHOP}/bundles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_bundle_is_unprocessable() {
    let app = app();
    let mut body = bundle_body();
    body["components"].as_array_mut().unwrap().truncate(1);
    let (status, message) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles"), Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(message.as_str().unwrap().contains("at least 2 products"));
}

#[tokio::test]
async fn test_metafields_feed_cart_transform() {
    let app = app();
    let (_, created) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles"), Some(bundle_body())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles/{id}/metafields"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let parent = json!({ "product_id": "gid://shopify/Product/500", "variant_id": "gid://shopify/ProductVariant/5000", "handle": "morning-ritual" });
    let (status, _) = send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles/{id}/parent"), Some(parent)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, fields) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles/{id}/metafields"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fields[0]["key"], "component_reference");
    assert_eq!(fields[1]["key"], "component_quantities");

    // The stored JSON text is exactly what the host hands to the transform.
    let cart = json!({
        "cart": { "lines": [{
            "id": "gid://shopify/CartLine/1",
            "quantity": 1,
            "merchandise": {
                "__typename": "ProductVariant",
                "id": "gid://shopify/ProductVariant/5000",
                "component_reference": { "value": fields[0]["value"] },
                "component_quantities": { "value": fields[1]["value"] }
            }
        }]}
    });
    let (status, result) = send(&app, "POST", "/api/v1/cart-transform/run", Some(cart)).await;
    assert_eq!(status, StatusCode::OK);
    let items = &result["operations"][0]["lineExpand"]["expandedCartItems"];
    assert_eq!(items[0], json!({ "merchandiseId": "gid://shopify/ProductVariant/11", "quantity": 2 }));
    assert_eq!(items[1], json!({ "merchandiseId": "gid://shopify/ProductVariant/21", "quantity": 1 }));

    let (_, offers) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/products/gid%3A%2F%2Fshopify%2FProduct%2F2/bundle-offers"), None).await;
    assert_eq!(offers["offers"][0]["handle"], "morning-ritual");
    assert_eq!(offers["offers"][0]["discountLabel"], "20%");
    assert_eq!(offers["offers"][0]["savings"], "10.00");
    assert_eq!(offers["metafield"]["ownerId"], "gid://shopify/Product/2");
}

#[tokio::test]
async fn test_cart_transform_without_bundles() {
    let cart = json!({ "cart": { "lines": [
        { "id": "gid://shopify/CartLine/1", "merchandise": { "__typename": "ProductVariant", "id": "gid://shopify/ProductVariant/1" } },
        { "id": "gid://shopify/CartLine/2", "merchandise": { "__typename": "CustomProduct" } }
    ]}});
    let (status, result) = send(&app(), "POST", "/api/v1/cart-transform/run", Some(cart)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result, json!({ "operations": [] }));
}

#[tokio::test]
async fn test_settings_roundtrip() {
    let app = app();
    let (_, defaults) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/settings"), None).await;
    assert_eq!(defaults["default_discount_type"], "percentage");
    assert_eq!(defaults["show_savings"], true);

    let input = json!({ "default_discount_type": "fixed_price", "default_badge_text": "Kit price", "show_savings": false });
    let (status, saved) = send(&app, "PUT", &format!("/api/v1/shops/{SHOP}/settings"), Some(input)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["default_badge_text"], "Kit price");

    let (_, after) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/settings"), None).await;
    assert_eq!(after["default_discount_type"], "fixed_price");
}

#[tokio::test]
async fn test_webhooks() {
    let app = app();
    send(&app, "POST", &format!("/api/v1/shops/{SHOP}/bundles"), Some(bundle_body())).await;

    let req = |topic: Option<&str>| {
        let mut b = Request::builder().method("POST").uri("/webhooks").header("x-shopify-shop-domain", SHOP);
        if let Some(t) = topic { b = b.header("x-shopify-topic", t); }
        b.body(Body::empty()).unwrap()
    };

    let resp = app.clone().oneshot(req(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.clone().oneshot(req(Some("customers/redact"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let (_, list) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles"), None).await;
    assert_eq!(list["total"], 1);

    let resp = app.clone().oneshot(req(Some("shop/redact"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let outcome: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(outcome["outcome"], "purged");
    assert_eq!(outcome["bundles"], 1);
    let (_, list) = send(&app, "GET", &format!("/api/v1/shops/{SHOP}/bundles"), None).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_metafield_definitions() {
    let (status, defs) = send(&app(), "GET", "/api/v1/metafield-definitions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defs.as_array().unwrap().len(), 3);
    assert_eq!(defs[0]["ownerType"], "PRODUCTVARIANT");
}
