use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::Actor,
    errors::ApiError,
    handlers::AppState,
    services::approval::ApprovalAction,
    services::cashbooks::CreateCashbookInput,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCashbookRequest {
    #[validate(length(min = 1))]
    pub voucher_no: String,
    pub site_id: i64,
    #[validate(length(min = 1))]
    pub payee: String,
    pub narration: Option<String>,
    pub amount: Decimal,
    pub voucher_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CashbookActionRequest {
    /// One of approve1, suspend, unsuspend
    #[validate(length(min = 1))]
    pub status_action: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/cashbooks",
    request_body = CreateCashbookRequest,
    responses((status = 201, description = "Cash voucher created as draft", body = serde_json::Value)),
    tag = "cashbooks"
)]
pub async fn create_cashbook(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCashbookRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateCashbookInput {
        voucher_no: payload.voucher_no,
        site_id: payload.site_id,
        payee: payload.payee,
        narration: payload.narration,
        amount: payload.amount,
        voucher_date: payload.voucher_date,
    };

    let voucher = state
        .services
        .cashbooks
        .create(actor.id, input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(voucher))
}

#[utoipa::path(
    post,
    path = "/api/v1/cashbooks/{id}/action",
    request_body = CashbookActionRequest,
    responses((status = 200, description = "Action applied", body = serde_json::Value)),
    tag = "cashbooks"
)]
pub async fn cashbook_action(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<CashbookActionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let action = ApprovalAction::from_str(&payload.status_action).map_err(|_| {
        ApiError::ValidationError(format!("unknown status action '{}'", payload.status_action))
    })?;

    let voucher = state
        .services
        .cashbooks
        .apply_action(id, &actor, action)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(voucher))
}

#[utoipa::path(
    get,
    path = "/api/v1/cashbooks/{id}",
    responses((status = 200, description = "Cash voucher", body = serde_json::Value)),
    tag = "cashbooks"
)]
pub async fn get_cashbook(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let voucher = state
        .services
        .cashbooks
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(voucher))
}

#[utoipa::path(
    get,
    path = "/api/v1/cashbooks",
    params(PaginationParams),
    responses((status = 200, description = "Paginated voucher list", body = serde_json::Value)),
    tag = "cashbooks"
)]
pub async fn list_cashbooks(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .cashbooks
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

pub fn cashbook_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cashbook).get(list_cashbooks))
        .route("/:id", get(get_cashbook))
        .route("/:id/action", post(cashbook_action))
}
