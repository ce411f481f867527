//! Axum route handlers for posting extraction.
//!
//! `POST /api/extract` is the extraction round-trip the panel awaits; the
//! latest result is cached so a panel that opens after the page was scraped
//! can still pick it up from `GET /api/extract/latest`.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::{extract_posting, ExtractedPosting};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: Option<String>,
    pub html: Option<String>,
    /// User-selected page text, used by the manual fallback.
    pub selection: Option<String>,
}

/// POST /api/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractedPosting>, AppError> {
    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing required field: url".to_string()))?;

    let posting = extract_posting(
        &url,
        request.html.as_deref().unwrap_or_default(),
        request.selection.as_deref(),
    );

    *state
        .latest_extraction
        .lock()
        .expect("extraction cache poisoned") = Some(posting.clone());

    Ok(Json(posting))
}

/// GET /api/extract/latest
pub async fn handle_latest_extraction(
    State(state): State<AppState>,
) -> Result<Json<ExtractedPosting>, AppError> {
    state
        .latest_extraction
        .lock()
        .expect("extraction cache poisoned")
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No extraction captured yet".to_string()))
}
