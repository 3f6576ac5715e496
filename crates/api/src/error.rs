//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use publish::PublishError;
use sales::SalesError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Sale processing error.
    Sales(SalesError),
    /// Catalog build error.
    Catalog(CatalogError),
    /// Publish cycle error.
    Publish(PublishError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Sales(err) => sales_error_to_response(err),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Publish(err) => publish_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, false)
            }
        };

        let body = serde_json::json!({ "error": message, "retryable": retryable });
        (status, axum::Json(body)).into_response()
    }
}

fn sales_error_to_response(err: SalesError) -> (StatusCode, String, bool) {
    let retryable = err.is_retryable();
    match &err {
        SalesError::Busy => (StatusCode::CONFLICT, err.to_string(), retryable),
        SalesError::SaleNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string(), retryable),
        SalesError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, err.to_string(), retryable),
        SalesError::Store(_) | SalesError::Record(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), retryable)
        }
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String, bool) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), false)
}

fn publish_error_to_response(err: PublishError) -> (StatusCode, String, bool) {
    match &err {
        PublishError::Config { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), false)
        }
        _ => (StatusCode::BAD_GATEWAY, err.to_string(), true),
    }
}

impl From<SalesError> for ApiError {
    fn from(err: SalesError) -> Self {
        ApiError::Sales(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        ApiError::Publish(err)
    }
}
