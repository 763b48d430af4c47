use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::store::StoreError;
use crate::tracker::TrackerError;

/// Diagnostic returned whenever the job collection cannot be served.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load job data.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The body is always `{ "error": string }`; details go to the log only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    LOAD_FAILURE_MESSAGE.to_string(),
                )
            }
            AppError::Ingest(IngestError::NoSources) => (
                StatusCode::BAD_REQUEST,
                "No raw job sources are configured".to_string(),
            ),
            AppError::Ingest(e) => {
                tracing::error!("Ingest error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Scrape ingest failed".to_string(),
                )
            }
            AppError::Tracker(e) => {
                tracing::error!("Tracker error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update tracked jobs".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
