//! Dashboard and review pages, served straight off the assets directory so
//! they can be edited without rebuilding the server.

use axum::{extract::State, response::Html};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /
pub async fn dashboard_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    serve_page(&state, "dashboard.html").await
}

/// GET /review
pub async fn review_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    serve_page(&state, "review.html").await
}

async fn serve_page(state: &AppState, name: &str) -> Result<Html<String>, AppError> {
    let path = state.config.assets_dir.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|_| AppError::NotFound(format!("Page not found: {name}")))
}
