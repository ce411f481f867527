pub mod health;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extract::handlers as extract_handlers;
use crate::generation::handlers as generation_handlers;
use crate::review::handlers as review_handlers;
use crate::state::AppState;
use crate::tracker;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::dashboard_page))
        .route("/review", get(pages::review_page))
        // Job lifecycle
        .route("/generate", post(generation_handlers::handle_generate))
        .route("/status/:job_id", get(generation_handlers::handle_status))
        .route("/api/jobs", get(generation_handlers::handle_list_jobs))
        // Review & compile
        .route("/api/review/:job_id", get(review_handlers::handle_review))
        .route("/api/compile/:job_id", post(review_handlers::handle_compile))
        .route("/files/:job_id/:file_type", get(review_handlers::handle_file))
        // Tracker
        .route("/api/csv", get(tracker::handle_list_applications))
        // Posting extraction
        .route("/api/extract", post(extract_handlers::handle_extract))
        .route(
            "/api/extract/latest",
            get(extract_handlers::handle_latest_extraction),
        )
        .with_state(state)
}
