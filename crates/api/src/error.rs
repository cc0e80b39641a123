//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use inventory::InventoryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout was rejected or failed.
    Checkout(CheckoutError),
    /// Inventory store error outside of checkout.
    Inventory(InventoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Inventory(err) => {
                tracing::error!(error = %err, "inventory store error");
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, serde_json::Value) {
    if !err.is_recoverable() {
        tracing::error!(error = %err, "checkout failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body(err.to_string()),
        );
    }

    let body = serde_json::json!({
        "error": err.to_string(),
        "product_id": err.product_id().map(|id| id.to_string()),
        "requested": err.requested(),
        "available": err.available(),
        "shortfall": err.shortfall(),
    });
    (StatusCode::CONFLICT, body)
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}
