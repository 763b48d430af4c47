//! Read-only job collection endpoints plus the scrape-ingest trigger.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::errors::AppError;
use crate::filter::{JobFilters, JobStats};
use crate::ingest::{run_ingest, IngestReport};
use crate::models::job::Job;
use crate::state::AppState;

/// GET /jobs
///
/// The full persisted collection, unfiltered and in stored order.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.store.load().await?))
}

/// GET /jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = state.store.load().await?;
    Ok(Json(filters.apply(&jobs).into_iter().cloned().collect()))
}

/// GET /jobs/stats
pub async fn handle_job_stats(State(state): State<AppState>) -> Result<Json<JobStats>, AppError> {
    let jobs = state.store.load().await?;
    let (saved, applied) = {
        let tracker = state.tracker.lock().await;
        (tracker.state().saved.len(), tracker.state().applied.len())
    };
    Ok(Json(JobStats::compute(&jobs, saved, applied)))
}

/// POST /scrape/jobs
///
/// Re-reads every configured raw source and replaces the collection.
pub async fn handle_scrape_jobs(
    State(state): State<AppState>,
) -> Result<Json<IngestReport>, AppError> {
    let sources = state.config.sources.clone();
    let store = state.store.clone();

    let report = tokio::task::spawn_blocking(move || {
        run_ingest(&sources, &store, Utc::now().date_naive())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(report))
}
