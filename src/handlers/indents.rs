use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::Actor,
    errors::ApiError,
    handlers::AppState,
    services::approval::ApprovalAction,
    services::indents::{CreateIndentInput, IndentLineEdit, IndentLineInput},
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
pub struct CreateIndentRequest {
    #[validate(length(min = 1))]
    pub indent_no: String,
    pub site_id: i64,
    pub required_by: Option<NaiveDate>,
    pub remark: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<IndentLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct IndentLineRequest {
    pub item_id: i64,
    pub qty: Decimal,
    pub remark: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct IndentActionRequest {
    /// One of approve1, approve2, complete, suspend, unsuspend
    #[validate(length(min = 1))]
    pub status_action: String,
    #[serde(default)]
    pub lines: Vec<IndentLineEditRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct IndentLineEditRequest {
    pub line_id: i64,
    pub qty: Option<Decimal>,
    pub approved1_qty: Option<Decimal>,
    pub approved2_qty: Option<Decimal>,
    pub remark: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/indents",
    request_body = CreateIndentRequest,
    responses((status = 201, description = "Indent created as draft", body = serde_json::Value)),
    tag = "indents"
)]
pub async fn create_indent(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateIndentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateIndentInput {
        indent_no: payload.indent_no,
        site_id: payload.site_id,
        required_by: payload.required_by,
        remark: payload.remark,
        lines: payload
            .lines
            .into_iter()
            .map(|l| IndentLineInput {
                item_id: l.item_id,
                qty: l.qty,
                remark: l.remark,
            })
            .collect(),
    };

    let indent = state
        .services
        .indents
        .create(actor.id, input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(indent))
}

#[utoipa::path(
    post,
    path = "/api/v1/indents/{id}/action",
    request_body = IndentActionRequest,
    responses((status = 200, description = "Action applied", body = serde_json::Value)),
    tag = "indents"
)]
pub async fn indent_action(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<IndentActionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let action = ApprovalAction::from_str(&payload.status_action).map_err(|_| {
        ApiError::ValidationError(format!("unknown status action '{}'", payload.status_action))
    })?;
    let edits = payload
        .lines
        .into_iter()
        .map(|l| IndentLineEdit {
            line_id: l.line_id,
            qty: l.qty,
            approved1_qty: l.approved1_qty,
            approved2_qty: l.approved2_qty,
            remark: l.remark,
        })
        .collect();

    let indent = state
        .services
        .indents
        .apply_action(id, &actor, action, edits)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(indent))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents/{id}",
    responses((status = 200, description = "Indent with lines", body = serde_json::Value)),
    tag = "indents"
)]
pub async fn get_indent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (indent, lines) = state
        .services
        .indents
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({
        "indent": indent,
        "lines": lines,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents",
    params(PaginationParams),
    responses((status = 200, description = "Paginated indent list", body = serde_json::Value)),
    tag = "indents"
)]
pub async fn list_indents(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .indents
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

pub fn indent_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_indent).get(list_indents))
        .route("/:id", get(get_indent))
        .route("/:id/action", post(indent_action))
}
