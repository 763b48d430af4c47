pub mod health;
pub mod jobs;
pub mod tracker;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as ai;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job collection
        .route("/jobs", get(jobs::handle_list_jobs))
        .route("/jobs/search", get(jobs::handle_search_jobs))
        .route("/jobs/stats", get(jobs::handle_job_stats))
        .route("/scrape/jobs", post(jobs::handle_scrape_jobs))
        // Saved / applied tracking
        .route("/tracker", get(tracker::handle_get_tracker))
        .route(
            "/tracker/saved/:id",
            get(tracker::handle_get_saved).post(tracker::handle_toggle_saved),
        )
        .route(
            "/tracker/applied/:id",
            get(tracker::handle_get_application)
                .put(tracker::handle_mark_applied)
                .delete(tracker::handle_unapply),
        )
        // AI proxy
        .route(
            "/ai/generate-cover-letter",
            post(ai::handle_generate_cover_letter),
        )
        .route("/ai/generate-resume", post(ai::handle_generate_resume))
        .with_state(state)
}
