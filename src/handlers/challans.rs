use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    auth::Actor,
    errors::ApiError,
    handlers::AppState,
    services::challans::{BillInput, CreateChallanInput, UpdateChallanInput},
    services::reconciliation::{ReceiptBatchInput, ReceiptLineInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateChallanRequest {
    pub site_id: i64,
    pub vendor_id: i64,
    pub po_id: i64,
    pub challan_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub remark: Option<String>,
    pub bill: Option<BillRequest>,
    #[validate(length(min = 1))]
    pub lines: Vec<ChallanLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateChallanRequest {
    pub challan_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub remark: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<ChallanLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChallanLineRequest {
    pub po_line_id: i64,
    pub receiving_qty: Decimal,
    #[serde(default)]
    pub batches: Vec<ChallanBatchRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChallanBatchRequest {
    #[validate(length(min = 1))]
    pub batch_number: String,
    /// Expiry month in `YYYY-MM` format
    pub expiry_date: String,
    pub receiving_qty: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BillRequest {
    #[validate(length(min = 1))]
    pub bill_no: String,
    pub bill_date: NaiveDate,
    pub bill_amount: Decimal,
    #[validate(range(min = 0))]
    pub due_days: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
}

/// Parses a `YYYY-MM` expiry into the first day of that month.
fn parse_expiry(value: &str) -> Result<NaiveDate, ApiError> {
    let parsed = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map_err(|_| {
            ApiError::ValidationError(format!("expiry_date '{}' is not in YYYY-MM format", value))
        })?;
    Ok(parsed)
}

fn to_line_inputs(lines: Vec<ChallanLineRequest>) -> Result<Vec<ReceiptLineInput>, ApiError> {
    lines
        .into_iter()
        .map(|line| {
            let batches = line
                .batches
                .into_iter()
                .map(|batch| {
                    Ok(ReceiptBatchInput {
                        batch_number: batch.batch_number,
                        expiry_date: parse_expiry(&batch.expiry_date)?,
                        qty: batch.receiving_qty,
                    })
                })
                .collect::<Result<Vec<_>, ApiError>>()?;
            Ok(ReceiptLineInput {
                po_line_id: line.po_line_id,
                receiving_qty: line.receiving_qty,
                batches,
            })
        })
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/challans",
    request_body = CreateChallanRequest,
    responses(
        (status = 201, description = "Challan created and reconciled", body = serde_json::Value),
        (status = 409, description = "Batch or document number conflict", body = crate::errors::ErrorResponse),
        (status = 422, description = "Receiving quantity exceeds remaining", body = crate::errors::ErrorResponse)
    ),
    tag = "challans"
)]
pub async fn create_challan(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateChallanRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateChallanInput {
        site_id: payload.site_id,
        vendor_id: payload.vendor_id,
        po_id: payload.po_id,
        challan_date: payload.challan_date,
        received_date: payload.received_date,
        vehicle_no: payload.vehicle_no,
        remark: payload.remark,
        bill: payload.bill.map(|b| BillInput {
            bill_no: b.bill_no,
            bill_date: b.bill_date,
            bill_amount: b.bill_amount,
            due_days: b.due_days,
        }),
        lines: to_line_inputs(payload.lines)?,
    };

    let challan = state
        .services
        .challans
        .create(actor.id, input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(challan))
}

#[utoipa::path(
    put,
    path = "/api/v1/challans/{id}",
    request_body = UpdateChallanRequest,
    responses(
        (status = 200, description = "Challan updated; previous ledger effect reversed and reapplied", body = serde_json::Value),
        (status = 404, description = "Challan not found", body = crate::errors::ErrorResponse)
    ),
    tag = "challans"
)]
pub async fn update_challan(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateChallanRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = UpdateChallanInput {
        challan_date: payload.challan_date,
        received_date: payload.received_date,
        vehicle_no: payload.vehicle_no,
        remark: payload.remark,
        lines: to_line_inputs(payload.lines)?,
    };

    let challan = state
        .services
        .challans
        .update(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(challan))
}

#[utoipa::path(
    get,
    path = "/api/v1/challans/{id}",
    responses(
        (status = 200, description = "Challan with lines, batches and closing stock", body = serde_json::Value),
        (status = 404, description = "Challan not found", body = crate::errors::ErrorResponse)
    ),
    tag = "challans"
)]
pub async fn get_challan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .challans
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/challans",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated challan list", body = serde_json::Value)
    ),
    tag = "challans"
)]
pub async fn list_challans(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .challans
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

#[utoipa::path(
    delete,
    path = "/api/v1/challans/{id}",
    responses(
        (status = 204, description = "Challan deleted; ledger effect reversed"),
        (status = 404, description = "Challan not found", body = crate::errors::ErrorResponse)
    ),
    tag = "challans"
)]
pub async fn delete_challan(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .challans
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    put,
    path = "/api/v1/challans/{id}/bill",
    request_body = BillRequest,
    responses(
        (status = 200, description = "Bill details updated", body = serde_json::Value)
    ),
    tag = "challans"
)]
pub async fn update_bill(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<BillRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let challan = state
        .services
        .challans
        .update_bill(
            id,
            BillInput {
                bill_no: payload.bill_no,
                bill_date: payload.bill_date,
                bill_amount: payload.bill_amount,
                due_days: payload.due_days,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(challan))
}

#[utoipa::path(
    post,
    path = "/api/v1/challans/{id}/payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded; payment status recomputed", body = serde_json::Value)
    ),
    tag = "challans"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let challan = state
        .services
        .challans
        .record_payment(id, payload.amount)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(challan))
}

pub fn challan_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_challan).get(list_challans))
        .route(
            "/:id",
            get(get_challan).put(update_challan).delete(delete_challan),
        )
        .route("/:id/bill", put(update_bill))
        .route("/:id/payments", post(record_payment))
}
