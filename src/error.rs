use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::booking::{BookingError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

fn booking_response(err: &BookingError) -> Response {
    let status = match err {
        BookingError::InvalidSlot(_) => StatusCode::BAD_REQUEST,
        BookingError::InvalidContact { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::SlotTaken { .. } => StatusCode::CONFLICT,
        BookingError::TransientFailure(details) => {
            tracing::error!(%details, "Booking request failed on storage");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let field = match err {
        BookingError::InvalidContact { field, .. } => Some(field.as_str()),
        _ => None,
    };

    let body = Json(json!({
        "error": {
            "kind": err.kind(),
            "message": err.user_message(),
            "details": err.to_string(),
            "field": field,
        }
    }));

    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Booking(err) => return booking_response(err),
            AppError::Store(StoreError::Conflict { .. }) => {
                (StatusCode::CONFLICT, "Resource conflict")
            }
            AppError::Store(StoreError::Storage(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage is temporarily unavailable",
            ),
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
