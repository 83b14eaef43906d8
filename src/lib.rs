//! sitebook-api library
//!
//! Back-office system for construction contractors: cash vouchers, material
//! indents, purchase orders, inward delivery challans and the per-site stock
//! ledger they feed.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// All `/api/v1` routes.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/sites", handlers::reference::site_routes())
        .nest("/items", handlers::reference::item_routes())
        .nest("/vendors", handlers::reference::vendor_routes())
        .nest("/cashbooks", handlers::cashbooks::cashbook_routes())
        .nest("/indents", handlers::indents::indent_routes())
        .nest(
            "/purchase-orders",
            handlers::purchase_orders::purchase_order_routes(),
        )
        .nest("/challans", handlers::challans::challan_routes())
        .nest("/stock", handlers::stock::stock_routes())
}

/// Builds the application router with shared middleware layers.
pub fn app_router(state: AppState) -> Router {
    use tower_http::{
        compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer,
    };

    Router::new()
        .route("/", get(|| async { "sitebook-api up" }))
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
