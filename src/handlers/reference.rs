use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::reference::{CreateItemInput, CreateSiteInput, CreateVendorInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSiteRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub unit: String,
    #[serde(default)]
    pub is_expiry_tracked: bool,
    pub hsn_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
    pub address: Option<String>,
}

pub async fn create_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let site = state
        .services
        .reference
        .create_site(CreateSiteInput {
            code: payload.code,
            name: payload.name,
            address: payload.address,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(site))
}

pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let site = state
        .services
        .reference
        .get_site(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(site))
}

pub async fn list_sites(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .reference
        .list_sites(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        models,
        params.page,
        params.per_page,
        total,
    )))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let item = state
        .services
        .reference
        .create_item(CreateItemInput {
            code: payload.code,
            name: payload.name,
            unit: payload.unit,
            is_expiry_tracked: payload.is_expiry_tracked,
            hsn_code: payload.hsn_code,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(item))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item = state
        .services
        .reference
        .get_item(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .reference
        .list_items(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        models,
        params.page,
        params.per_page,
        total,
    )))
}

pub async fn create_vendor(
    State(state): State<AppState>,
    Json(payload): Json<CreateVendorRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let vendor = state
        .services
        .reference
        .create_vendor(CreateVendorInput {
            name: payload.name,
            contact_person: payload.contact_person,
            phone: payload.phone,
            gst_number: payload.gst_number,
            address: payload.address,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(vendor))
}

pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let vendor = state
        .services
        .reference
        .get_vendor(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

pub async fn list_vendors(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (models, total) = state
        .services
        .reference
        .list_vendors(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        models,
        params.page,
        params.per_page,
        total,
    )))
}

pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_site).get(list_sites))
        .route("/:id", get(get_site))
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id", get(get_item))
}

pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vendor).get(list_vendors))
        .route("/:id", get(get_vendor))
}
