use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tracker::{ApplicationMeta, ApplicationUpdate, Tracker, TrackerError, TrackerState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    pub job_id: String,
    pub saved: bool,
}

/// Runs a persisting tracker operation on a blocking thread. The lock is held
/// for the whole write so commits stay ordered.
async fn with_tracker<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&mut Tracker) -> Result<T, TrackerError> + Send + 'static,
    T: Send + 'static,
{
    let mut tracker = state.tracker.clone().lock_owned().await;
    let result = tokio::task::spawn_blocking(move || op(&mut tracker))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(result)
}

/// GET /tracker
pub async fn handle_get_tracker(State(state): State<AppState>) -> Json<TrackerState> {
    Json(state.tracker.lock().await.state().clone())
}

/// GET /tracker/saved/:id
pub async fn handle_get_saved(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<SavedResponse> {
    let saved = state.tracker.lock().await.is_saved(&job_id);
    Json(SavedResponse { job_id, saved })
}

/// POST /tracker/saved/:id
pub async fn handle_toggle_saved(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SavedResponse>, AppError> {
    let id = job_id.clone();
    let saved = with_tracker(&state, move |tracker| tracker.toggle_saved(&id)).await?;
    Ok(Json(SavedResponse { job_id, saved }))
}

/// GET /tracker/applied/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ApplicationMeta>, AppError> {
    state
        .tracker
        .lock()
        .await
        .application(&job_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No application recorded for {job_id}")))
}

/// PUT /tracker/applied/:id
pub async fn handle_mark_applied(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<ApplicationMeta>, AppError> {
    let meta = with_tracker(&state, move |tracker| tracker.mark_applied(&job_id, update)).await?;
    Ok(Json(meta))
}

/// DELETE /tracker/applied/:id
pub async fn handle_unapply(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = job_id.clone();
    if with_tracker(&state, move |tracker| tracker.unapply(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No application recorded for {job_id}")))
    }
}
