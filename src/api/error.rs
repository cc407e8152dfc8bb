//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbError;
use crate::service::{ExportError, GeoError, MapError, RecordError};

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Record still referenced by other rows (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store could not be reached at start-up (503)
    #[error("Database unavailable: {0}")]
    StoreUnavailable(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Boundary dataset missing or malformed (500)
    #[error("Geo reference error: {0}")]
    GeoReference(String),

    /// Download encoding failed (500)
    #[error("Export failed: {0}")]
    Export(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_)
            | ApiError::GeoReference(_)
            | ApiError::Export(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::StoreUnavailable(_) => "store_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::GeoReference(_) => "geo_reference_error",
            ApiError::Export(_) => "export_error",
            ApiError::Internal(_) => "internal_error",
        };
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API error"
            );
        } else {
            tracing::warn!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API request rejected"
            );
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id,
        })
    }
}

/// Answer malformed bodies, query strings and path segments with `ErrorResponse`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    );
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => ApiError::NotFound(id),
            DbError::Unavailable(reason) => ApiError::StoreUnavailable(reason),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Invalid(msg) => ApiError::BadRequest(msg),
            RecordError::UnknownCountry(name) => {
                ApiError::BadRequest(format!("Unknown country: {}", name))
            }
            RecordError::UnknownVaccination(_) => ApiError::BadRequest(err.to_string()),
            RecordError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RecordError::InUse { .. } => ApiError::Conflict(err.to_string()),
            RecordError::Db(e) => e.into(),
        }
    }
}

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        ApiError::GeoReference(err.to_string())
    }
}

impl From<MapError> for ApiError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::Db(e) => e.into(),
            MapError::Geo(e) => e.into(),
            MapError::OutOfRange { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err.to_string())
    }
}
