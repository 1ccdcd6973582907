//! HTTP surface

use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cart_transform::{self, CartTransformInput, CartTransformResult};
use crate::domain::aggregates::{AppSettings, Bundle, BundleInput, BundleOffer, BundleParent, SettingsInput};
use crate::domain::metafields::{self, MetafieldDefinition, MetafieldInput};
use crate::service::{BundleList, BundleService, ListParams, WebhookOutcome, WebhookTopic};
use crate::BundleError;

pub const TOPIC_HEADER: &str = "x-shopify-topic";
pub const SHOP_HEADER: &str = "x-shopify-shop-domain";

#[derive(Clone)] pub struct AppState { pub bundles: BundleService }

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "bundlecraft"})) }))
        .route("/api/v1/cart-transform/run", post(run_cart_transform))
        .route("/api/v1/metafield-definitions", get(metafield_definitions))
        .route("/api/v1/shops/:shop/bundles", get(list_bundles).post(create_bundle))
        .route("/api/v1/shops/:shop/bundles/:id", get(get_bundle).put(update_bundle).delete(delete_bundle))
        .route("/api/v1/shops/:shop/bundles/:id/duplicate", post(duplicate_bundle))
        .route("/api/v1/shops/:shop/bundles/:id/archive", post(archive_bundle))
        .route("/api/v1/shops/:shop/bundles/:id/parent", post(link_parent))
        .route("/api/v1/shops/:shop/bundles/:id/metafields", get(variant_metafields))
        .route("/api/v1/shops/:shop/products/:product_id/bundle-offers", get(product_offers))
        .route("/api/v1/shops/:shop/settings", get(get_settings).put(save_settings))
        .route("/webhooks", post(webhook))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

fn reject(e: BundleError) -> (StatusCode, String) {
    let status = match &e {
        BundleError::BundleNotFound => StatusCode::NOT_FOUND,
        BundleError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BundleError::NotLinked => StatusCode::CONFLICT,
        BundleError::Config(_) | BundleError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() { tracing::error!(error = %e, "request failed"); }
    (status, e.to_string())
}

async fn run_cart_transform(Json(input): Json<CartTransformInput>) -> Json<CartTransformResult> {
    let eval = cart_transform::evaluate_with_report(&input);
    for skipped in &eval.skipped {
        tracing::warn!(cart_line_id = %skipped.cart_line_id, reason = %skipped.reason, "bundle line left unexpanded");
    }
    Json(eval.result)
}

async fn metafield_definitions() -> Json<Vec<MetafieldDefinition>> { Json(metafields::definitions()) }

async fn list_bundles(State(s): State<AppState>, Path(shop): Path<String>, Query(p): Query<ListParams>) -> ApiResult<Json<BundleList>> {
    s.bundles.list(&shop, &p).await.map(Json).map_err(reject)
}

async fn get_bundle(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>) -> ApiResult<Json<Bundle>> {
    s.bundles.get(&shop, &id).await.map(Json).map_err(reject)
}

async fn create_bundle(State(s): State<AppState>, Path(shop): Path<String>, Json(r): Json<BundleInput>) -> ApiResult<(StatusCode, Json<Bundle>)> {
    let b = s.bundles.create(&shop, r).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(b)))
}

async fn update_bundle(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>, Json(r): Json<BundleInput>) -> ApiResult<Json<Bundle>> {
    s.bundles.update(&shop, &id, r).await.map(Json).map_err(reject)
}

async fn delete_bundle(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>) -> ApiResult<StatusCode> {
    s.bundles.delete(&shop, &id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn duplicate_bundle(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>) -> ApiResult<(StatusCode, Json<Bundle>)> {
    let b = s.bundles.duplicate(&shop, &id).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(b)))
}

async fn archive_bundle(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>) -> ApiResult<Json<Bundle>> {
    s.bundles.archive(&shop, &id).await.map(Json).map_err(reject)
}

async fn link_parent(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>, Json(r): Json<BundleParent>) -> ApiResult<Json<Bundle>> {
    s.bundles.link_parent(&shop, &id, r).await.map(Json).map_err(reject)
}

async fn variant_metafields(State(s): State<AppState>, Path((shop, id)): Path<(String, String)>) -> ApiResult<Json<Vec<MetafieldInput>>> {
    s.bundles.variant_metafields(&shop, &id).await.map(Json).map_err(reject)
}

#[derive(Debug, Serialize)] pub struct ProductOffers { pub offers: Vec<BundleOffer>, pub metafield: MetafieldInput }

async fn product_offers(State(s): State<AppState>, Path((shop, product_id)): Path<(String, String)>) -> ApiResult<Json<ProductOffers>> {
    let offers = s.bundles.product_offers(&shop, &product_id).await.map_err(reject)?;
    let metafield = s.bundles.product_offers_metafield(&shop, &product_id).await.map_err(reject)?;
    Ok(Json(ProductOffers { offers, metafield }))
}

async fn get_settings(State(s): State<AppState>, Path(shop): Path<String>) -> ApiResult<Json<AppSettings>> {
    s.bundles.settings(&shop).await.map(Json).map_err(reject)
}

async fn save_settings(State(s): State<AppState>, Path(shop): Path<String>, Json(r): Json<SettingsInput>) -> ApiResult<Json<AppSettings>> {
    s.bundles.save_settings(&shop, r).await.map(Json).map_err(reject)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|v| !v.trim().is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Missing {name} header")))
}

async fn webhook(State(s): State<AppState>, headers: HeaderMap) -> ApiResult<Json<WebhookOutcome>> {
    let topic = WebhookTopic::parse(header(&headers, TOPIC_HEADER)?);
    let shop = header(&headers, SHOP_HEADER)?;
    s.bundles.handle_webhook(shop, &topic).await.map(Json).map_err(reject)
}
