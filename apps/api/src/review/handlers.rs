//! Axum route handlers for review, compilation, and file download.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::handlers::lookup_job;
use crate::review::latex::compile_tex;
use crate::review::{
    cover_letter_pdf, cover_letter_tex, resume_pdf, resume_tex, EMAIL_DRAFT_FILE,
};
use crate::state::AppState;
use crate::store::JobStatus;
use crate::tracker;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub slug: String,
    pub resume: String,
    pub cover_letter: String,
    pub email: String,
    pub has_pdfs: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub open_pdfs: bool,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub log: String,
}

/// GET /api/review/:jobId
///
/// Returns the editable document texts for a job. Missing files come back
/// as empty strings; the review page treats that as "nothing generated yet".
pub async fn handle_review(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ReviewResponse>, AppError> {
    let job = lookup_job(&state, &job_id)?;
    let job_dir = state.config.job_dir(&job.slug);

    let resume = tokio::fs::read_to_string(job_dir.join(resume_tex(&job.slug)))
        .await
        .unwrap_or_default();
    let cover_letter = tokio::fs::read_to_string(job_dir.join(cover_letter_tex(&job.slug)))
        .await
        .unwrap_or_default();
    let email = tokio::fs::read_to_string(job_dir.join(EMAIL_DRAFT_FILE))
        .await
        .unwrap_or_default();
    let has_pdfs = tokio::fs::try_exists(job_dir.join(resume_pdf(&job.slug)))
        .await
        .unwrap_or(false);

    Ok(Json(ReviewResponse {
        slug: job.slug,
        resume,
        cover_letter,
        email,
        has_pdfs,
    }))
}

/// POST /api/compile/:jobId
///
/// Writes review edits over the generated files, then compiles both
/// documents. Either compile failing makes the overall result a failure,
/// but both are always attempted and the accumulated log is returned
/// regardless. Only overall success moves the job to `complete`.
pub async fn handle_compile(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<CompileRequest>,
) -> Result<Json<CompileResponse>, AppError> {
    let job = lookup_job(&state, &job_id)?;
    let job_id = job.job_id;
    let job_dir = state.config.job_dir(&job.slug);

    let resume_file = resume_tex(&job.slug);
    let cover_file = cover_letter_tex(&job.slug);
    let mut log = String::new();

    // Review edits win over generator output.
    let overrides = [
        (&request.resume, resume_file.as_str()),
        (&request.cover_letter, cover_file.as_str()),
        (&request.email, EMAIL_DRAFT_FILE),
    ];
    for (text, filename) in overrides {
        if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
            if let Err(e) = tokio::fs::write(job_dir.join(filename), text).await {
                return Ok(Json(CompileResponse {
                    success: false,
                    error: Some(format!("Failed to write {filename}: {e}")),
                    log,
                }));
            }
        }
    }

    let mut success = true;
    for tex_file in [resume_file.as_str(), cover_file.as_str()] {
        let (ok, output) = compile_tex(&state.config.latexmk_bin, &job_dir, tex_file).await;
        log.push_str(&format!("--- {tex_file} ---\n{output}\n"));
        success &= ok;
    }

    if !success {
        return Ok(Json(CompileResponse {
            success: false,
            error: Some("latexmk failed for at least one document".to_string()),
            log,
        }));
    }

    if request.open_pdfs && state.config.open_browser {
        for file_type in ["resume", "cover-letter"] {
            let url = format!(
                "http://localhost:{}/files/{job_id}/{file_type}",
                state.config.port
            );
            let _ = open::that_detached(&url);
        }
    }

    let resume_pdf_name = resume_pdf(&job.slug);
    let cover_pdf_name = cover_letter_pdf(&job.slug);
    state
        .store
        .update(job_id, |job| {
            job.transition(JobStatus::Complete, "Compiled successfully.".to_string());
            job.resume_file = Some(resume_pdf_name);
            job.cover_letter_file = Some(cover_pdf_name);
        })
        .await;

    // Non-critical side effect of a complete job; failure is logged only.
    if let Err(e) = tracker::append_application(&state.config.csv_path(), &job).await {
        error!("CSV append error: {e}");
    } else {
        info!("[{job_id}] Appended to applications.csv");
    }

    Ok(Json(CompileResponse {
        success: true,
        error: None,
        log,
    }))
}

/// GET /files/:jobId/:type
///
/// Serves a produced document: `resume` / `cover-letter` PDFs inline,
/// `email` as markdown.
pub async fn handle_file(
    State(state): State<AppState>,
    Path((job_id, file_type)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let job = lookup_job(&state, &job_id)?;

    let filename = match file_type.as_str() {
        "resume" => resume_pdf(&job.slug),
        "cover-letter" => cover_letter_pdf(&job.slug),
        "email" => EMAIL_DRAFT_FILE.to_string(),
        _ => return Err(AppError::Validation("Invalid file type".to_string())),
    };

    let path = state.config.job_dir(&job.slug).join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound(format!("File not found: {filename}")))?;

    let response = if filename.ends_with(".pdf") {
        (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response()
    } else {
        ([(header::CONTENT_TYPE, "text/markdown".to_string())], bytes).into_response()
    };

    Ok(response)
}
