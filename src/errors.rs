use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Standard error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Unprocessable Entity",
    "message": "Receiving quantity 70 exceeds remaining quantity 40 on purchase order line 12",
    "details": null,
    "timestamp": "2025-04-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Structured detail (offending field, limit, actual value) when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Receiving quantity {requested} exceeds remaining quantity {remaining} on purchase order line {po_line_id}")]
    QuantityExceeded {
        po_line_id: i64,
        remaining: Decimal,
        requested: Decimal,
    },

    #[error("Batch {batch_number} already exists with expiry {existing}, got {incoming}")]
    BatchConflict {
        batch_number: String,
        existing: NaiveDate,
        incoming: NaiveDate,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Wraps a string-based database failure.
    pub fn db_error(message: impl Into<String>) -> Self {
        ServiceError::DatabaseError(DbErr::Custom(message.into()))
    }

    /// Returns the HTTP status code for this error.
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InvalidInput(_)
            | Self::InvalidOperation(_)
            | Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::QuantityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BatchConflict { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the message suitable for HTTP responses.
    /// Internal failures get a generic message so implementation details never leak.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Structured detail for errors where the caller needs the field, limit and
    /// actual value to explain the rejection to an operator.
    pub fn response_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::QuantityExceeded {
                po_line_id,
                remaining,
                requested,
            } => Some(json!({
                "po_line_id": po_line_id,
                "remaining_qty": remaining,
                "requested_qty": requested,
            })),
            Self::BatchConflict {
                batch_number,
                existing,
                incoming,
            } => Some(json!({
                "batch_number": batch_number,
                "existing_expiry": existing.format("%Y-%m").to_string(),
                "incoming_expiry": incoming.format("%Y-%m").to_string(),
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// API error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(err) => err.into_response(),
            ApiError::ValidationError(message) => {
                let err = ErrorResponse {
                    error: "Bad Request".to_string(),
                    message,
                    details: None,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (StatusCode::BAD_REQUEST, Json(err)).into_response()
            }
            ApiError::Unauthorized(message) => {
                let err = ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message,
                    details: None,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (StatusCode::UNAUTHORIZED, Json(err)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_exceeded_maps_to_unprocessable_entity() {
        let err = ServiceError::QuantityExceeded {
            po_line_id: 12,
            remaining: dec!(40),
            requested: dec!(70),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.response_details().expect("details");
        assert_eq!(details["po_line_id"], 12);
    }

    #[test]
    fn internal_errors_never_leak_details() {
        let err = ServiceError::db_error("password=hunter2");
        assert_eq!(err.response_message(), "Database error");
        assert!(err.response_details().is_none());
    }
}
