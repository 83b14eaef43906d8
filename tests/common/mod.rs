//! Test harness: application state and router over an in-memory SQLite
//! database, driven through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use rust_decimal::Decimal;
use sea_orm::ConnectOptions;
use serde_json::Value;
use sitebook_api::{
    auth::{ACTOR_CAPABILITIES_HEADER, ACTOR_ID_HEADER, ACTOR_ROLES_HEADER},
    config::AppConfig,
    events::EventSender,
    handlers::AppServices,
    migrator::Migrator,
    AppState,
};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// An acting user for requests: id plus capability/role facts.
#[derive(Debug, Clone)]
pub struct TestActor {
    pub id: Uuid,
    pub capabilities: Vec<&'static str>,
    pub roles: Vec<&'static str>,
}

impl TestActor {
    pub fn new(capabilities: &[&'static str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            capabilities: capabilities.to_vec(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles(capabilities: &[&'static str], roles: &[&'static str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            capabilities: capabilities.to_vec(),
            roles: roles.to_vec(),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Fresh application over an in-memory SQLite database with the full
    /// schema applied.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // A single connection keeps every query on the same in-memory
        // database.
        let mut options = ConnectOptions::new(cfg.database_url.clone());
        options.max_connections(1).min_connections(1);
        let pool = sea_orm::Database::connect(options)
            .await
            .expect("failed to create test database");
        Migrator::up(&pool, None).await.expect("migrations");

        let db = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(sitebook_api::events::process_events(event_rx));

        let services = AppServices::new(db.clone(), &cfg, event_sender.clone());
        let state = AppState {
            db,
            config: cfg,
            event_sender,
            services,
        };
        let router = sitebook_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Sends a request without actor headers.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
                    .expect("request")
            }
            None => builder.body(Body::empty()).expect("request"),
        };
        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Sends a request carrying the actor's id, capabilities and roles.
    pub async fn request_as(
        &self,
        actor: &TestActor,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_ID_HEADER, actor.id.to_string());
        if !actor.capabilities.is_empty() {
            builder = builder.header(ACTOR_CAPABILITIES_HEADER, actor.capabilities.join(","));
        }
        if !actor.roles.is_empty() {
            builder = builder.header(ACTOR_ROLES_HEADER, actor.roles.join(","));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.router.clone().oneshot(request).await.expect("response")
    }
}

/// Reads a response body as JSON.
pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Creates a site and returns its id.
pub async fn seed_site(app: &TestApp, code: &str) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/sites",
            Some(serde_json::json!({ "code": code, "name": format!("Site {code}") })),
        )
        .await;
    assert_eq!(response.status(), 201, "seed site");
    response_json(response).await["id"].as_i64().expect("site id")
}

/// Creates an item and returns its id.
pub async fn seed_item(app: &TestApp, code: &str, is_expiry_tracked: bool) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(serde_json::json!({
                "code": code,
                "name": format!("Item {code}"),
                "unit": "bag",
                "is_expiry_tracked": is_expiry_tracked,
            })),
        )
        .await;
    assert_eq!(response.status(), 201, "seed item");
    response_json(response).await["id"].as_i64().expect("item id")
}

/// Creates a vendor and returns its id.
pub async fn seed_vendor(app: &TestApp, name: &str) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors",
            Some(serde_json::json!({ "name": name })),
        )
        .await;
    assert_eq!(response.status(), 201, "seed vendor");
    response_json(response).await["id"].as_i64().expect("vendor id")
}

/// Creates a draft purchase order and returns `(po_id, line_ids)` with the
/// line ids in the order of `lines`.
pub async fn seed_purchase_order(
    app: &TestApp,
    actor: &TestActor,
    po_no: &str,
    site_id: i64,
    vendor_id: i64,
    lines: &[(i64, &str, &str)],
) -> (i64, Vec<i64>) {
    let line_payload: Vec<Value> = lines
        .iter()
        .map(|(item_id, qty, rate)| {
            serde_json::json!({ "item_id": item_id, "ordered_qty": qty, "rate": rate })
        })
        .collect();
    let response = app
        .request_as(
            actor,
            Method::POST,
            "/api/v1/purchase-orders",
            Some(serde_json::json!({
                "po_no": po_no,
                "site_id": site_id,
                "vendor_id": vendor_id,
                "lines": line_payload,
            })),
        )
        .await;
    assert_eq!(response.status(), 201, "seed purchase order");
    let po_id = response_json(response).await["id"].as_i64().expect("po id");

    let response = app
        .request(Method::GET, &format!("/api/v1/purchase-orders/{po_id}"), None)
        .await;
    let body = response_json(response).await;
    let line_ids = body["lines"]
        .as_array()
        .expect("po lines")
        .iter()
        .map(|l| l["id"].as_i64().expect("line id"))
        .collect();

    (po_id, line_ids)
}

/// Decimal fields serialize as strings; accept numbers too for convenience.
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal value: {other:?}"),
    }
}
