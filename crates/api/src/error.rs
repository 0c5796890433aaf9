use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use humlab_cloud::BlobStoreError;
use humlab_core::error::CoreError;
use humlab_pipeline::{ConversionError, PromotionError};

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error enums and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `humlab_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A conversion pipeline error.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A promotion / saved-track error.
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// A blob store error from a handler that talks to storage directly.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or unusable caller identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Conversion(err) => match err {
                ConversionError::InvalidNotes(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                ConversionError::SynthesisFailed(inner) => {
                    tracing::warn!(error = %inner, "Synthesis engine failure");
                    (
                        StatusCode::BAD_GATEWAY,
                        "SYNTHESIS_FAILED",
                        "Audio synthesis failed; retry or adjust the notes".to_string(),
                    )
                }
                ConversionError::StorageFailed(inner) => {
                    tracing::error!(error = %inner, "Blob store failure during conversion");
                    (
                        StatusCode::BAD_GATEWAY,
                        "STORAGE_FAILED",
                        "Artifact storage is unavailable; retry later".to_string(),
                    )
                }
                ConversionError::PersistenceFailed(inner) => {
                    tracing::error!(error = %inner, "Persistence failure during conversion");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Promotion(err) => match err {
                PromotionError::InvalidName(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                PromotionError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                PromotionError::Unauthorized { .. } => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
                }
                PromotionError::Database(inner) => classify_sqlx_error(inner),
            },

            AppError::Blob(err) => {
                tracing::error!(error = %err, "Blob store failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORAGE_FAILED",
                    "Artifact storage is unavailable; retry later".to_string(),
                )
            }

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// `RowNotFound` maps to 404; everything else maps to 500 with a sanitized
/// message so database internals never leak to clients.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
