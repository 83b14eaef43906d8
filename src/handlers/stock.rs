use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState, services::stock_ledger};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClosingStockParams {
    pub site_id: i64,
    /// Comma-separated item ids
    pub item_ids: String,
}

impl ClosingStockParams {
    fn parse_item_ids(&self) -> Result<Vec<i64>, ApiError> {
        self.item_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>().map_err(|_| {
                    ApiError::ValidationError(format!("'{}' is not a valid item id", s))
                })
            })
            .collect()
    }
}

/// Closing stock from the running balance rows.
#[utoipa::path(
    get,
    path = "/api/v1/stock/closing",
    params(ClosingStockParams),
    responses((status = 200, description = "Closing quantity per item id", body = serde_json::Value)),
    tag = "stock"
)]
pub async fn closing_stock(
    State(state): State<AppState>,
    Query(params): Query<ClosingStockParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item_ids = params.parse_item_ids()?;
    let totals = stock_ledger::closing_stock(&*state.db, params.site_id, &item_ids)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(totals))
}

/// Same answer derived by folding the stock transaction log; interchangeable
/// with [`closing_stock`] from the caller's perspective.
#[utoipa::path(
    get,
    path = "/api/v1/stock/closing-from-log",
    params(ClosingStockParams),
    responses((status = 200, description = "Closing quantity per item id", body = serde_json::Value)),
    tag = "stock"
)]
pub async fn closing_stock_from_log(
    State(state): State<AppState>,
    Query(params): Query<ClosingStockParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item_ids = params.parse_item_ids()?;
    let totals = stock_ledger::closing_stock_from_log(&*state.db, params.site_id, &item_ids)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(totals))
}

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/closing", get(closing_stock))
        .route("/closing-from-log", get(closing_stock_from_log))
}
