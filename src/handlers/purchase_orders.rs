use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::Actor,
    errors::ApiError,
    handlers::AppState,
    services::approval::ApprovalAction,
    services::purchase_orders::{CreatePurchaseOrderInput, PoLineEdit, PoLineInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    #[validate(length(min = 1))]
    pub po_no: String,
    pub site_id: i64,
    pub vendor_id: i64,
    pub indent_id: Option<i64>,
    pub expected_date: Option<NaiveDate>,
    pub remark: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<PurchaseOrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderLineRequest {
    pub item_id: i64,
    pub ordered_qty: Decimal,
    pub rate: Decimal,
}

/// Approval action with optional line edits, persisted atomically with the
/// status change.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderActionRequest {
    /// One of approve1, approve2, complete, suspend, unsuspend
    #[validate(length(min = 1))]
    pub status_action: String,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLineEditRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderLineEditRequest {
    pub line_id: i64,
    pub qty: Option<Decimal>,
    pub approved1_qty: Option<Decimal>,
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created as draft", body = serde_json::Value),
        (status = 409, description = "Duplicate purchase order number", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreatePurchaseOrderInput {
        po_no: payload.po_no,
        site_id: payload.site_id,
        vendor_id: payload.vendor_id,
        indent_id: payload.indent_id,
        expected_date: payload.expected_date,
        remark: payload.remark,
        lines: payload
            .lines
            .into_iter()
            .map(|l| PoLineInput {
                item_id: l.item_id,
                ordered_qty: l.ordered_qty,
                rate: l.rate,
            })
            .collect(),
    };

    let po = state
        .services
        .purchase_orders
        .create(actor.id, input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(po))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/action",
    request_body = PurchaseOrderActionRequest,
    responses(
        (status = 200, description = "Action applied; may auto-escalate to level 2", body = serde_json::Value),
        (status = 403, description = "Capability or self-approval guard failed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn purchase_order_action(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<PurchaseOrderActionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let action = ApprovalAction::from_str(&payload.status_action).map_err(|_| {
        ApiError::ValidationError(format!("unknown status action '{}'", payload.status_action))
    })?;
    let edits = payload
        .lines
        .into_iter()
        .map(|l| PoLineEdit {
            line_id: l.line_id,
            qty: l.qty,
            approved1_qty: l.approved1_qty,
            approved2_qty: l.approved2_qty,
            remark: l.remark,
        })
        .collect();

    let po = state
        .services
        .purchase_orders
        .apply_action(id, &actor, action, edits)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(po))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    responses(
        (status = 200, description = "Purchase order with lines", body = serde_json::Value),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (po, lines) = state
        .services
        .purchase_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({
        "purchase_order": po,
        "lines": lines,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated purchase order list", body = serde_json::Value)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .purchase_orders
        .list(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        models,
        params.page,
        params.per_page,
        total,
    )))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order).get(list_purchase_orders))
        .route("/:id", get(get_purchase_order))
        .route("/:id/action", post(purchase_order_action))
}
