//! HTTP error responses.
//!
//! Every failure leaves the server as a JSON body `{error, detail}`
//! with the status code matching the failure class. Store and scan
//! errors convert into their HTTP shapes here, so handlers can lean
//! on `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use labdeck_scan::ScanError;
use labdeck_store::StoreError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 401: credentials configured but absent or wrong.
    Unauthorized,
    /// 400: malformed input (bad CIDR, out-of-range parameter).
    BadRequest(String),
    /// 400: document failed schema validation.
    Validation(String),
    /// 404: named backup absent.
    NotFound(String),
    /// 503: the scanning binary is not installed.
    ToolMissing(String),
    /// 502: the scanning binary ran and failed.
    ToolFailed(String),
    /// 500: file I/O or serialization failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid or missing credentials".to_string(),
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "bad request", detail),
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "validation failed", detail)
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "not found", detail),
            ApiError::ToolMissing(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, "nmap not installed", detail)
            }
            ApiError::ToolFailed(detail) => (StatusCode::BAD_GATEWAY, "nmap failed", detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error", detail)
            }
        };

        (
            status,
            Json(ApiErrorBody {
                error: error.to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => ApiError::NotFound(name),
            StoreError::Validation(detail) => ApiError::Validation(detail),
            StoreError::Io(e) => ApiError::Internal(e.to_string()),
            StoreError::Serialization(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::ToolMissing { path } => ApiError::ToolMissing(path),
            ScanError::ToolFailed { detail } => ApiError::ToolFailed(detail),
        }
    }
}
