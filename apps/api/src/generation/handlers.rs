//! Axum route handlers for the job lifecycle: create, poll, list.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::run_generation;
use crate::generation::prompt::{build_prompt, PromptInputs};
use crate::generation::slug::slugify;
use crate::state::AppState;
use crate::store::{Job, JobStatus};

/// Slug used when a company name has no alphanumeric content at all.
const FALLBACK_SLUG: &str = "job";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub company: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub job_id: Uuid,
    pub slug: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
    pub slug: String,
    pub files: Vec<String>,
    pub resume_file: Option<String>,
    pub cover_letter_file: Option<String>,
    pub email_draft: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: Uuid,
    pub slug: String,
    pub company: String,
    pub title: String,
    pub status: JobStatus,
    pub message: String,
    pub files: Vec<String>,
    pub resume_file: Option<String>,
    pub cover_letter_file: Option<String>,
}

/// POST /generate
///
/// Validates the posting, stages the job directory and prompt, records the
/// job as `processing`, and returns immediately; generation itself runs on
/// a detached task and is observed via `/status/:jobId` polling.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let (company, title, description) = match (
        non_empty(request.company),
        non_empty(request.title),
        non_empty(request.description),
    ) {
        (Some(c), Some(t), Some(d)) => (c, t, d),
        _ => {
            return Err(AppError::Validation(
                "Missing required fields: company, title, description".to_string(),
            ))
        }
    };
    let link = request.link.unwrap_or_default();

    let mut slug = slugify(&company);
    if slug.is_empty() {
        slug = FALLBACK_SLUG.to_string();
    }

    let job_dir = state.config.job_dir(&slug);
    tokio::fs::create_dir_all(&job_dir).await?;
    tokio::fs::write(
        job_dir.join("job-description.txt"),
        format!("Company: {company}\nTitle: {title}\n\n{description}"),
    )
    .await?;

    // Template files are fixed project configuration; unreadable means 500,
    // no job created, nothing to retry.
    let resume_content = read_template(&state, "resume.tex").await?;
    let cover_letter_content = read_template(&state, "cover-letter.tex").await?;

    let prompt = build_prompt(
        &state.config.prompt_template,
        PromptInputs {
            resume_content: &resume_content,
            cover_letter_content: &cover_letter_content,
            company: &company,
            title: &title,
            description: &description,
            slug: &slug,
        },
    )
    .await?;

    let job = Job::new(company, title, link, slug.clone());
    let job_id = job.job_id;
    state.store.insert(job).await;

    info!("[{job_id}] Generation started for {slug}");
    tokio::spawn(run_generation(state.clone(), job_id, slug.clone(), prompt));

    Ok(Json(GenerateResponse {
        job_id,
        slug,
        status: JobStatus::Processing,
    }))
}

/// GET /status/:jobId
pub async fn handle_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let job = lookup_job(&state, &job_id)?;
    Ok(Json(StatusResponse {
        job_id: job.job_id,
        status: job.status,
        message: job.message,
        slug: job.slug,
        files: job.files,
        resume_file: job.resume_file,
        cover_letter_file: job.cover_letter_file,
        email_draft: job.email_draft,
    }))
}

/// GET /api/jobs — all jobs, newest first.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<JobSummary>> {
    let summaries = state
        .store
        .list()
        .into_iter()
        .map(|job| JobSummary {
            job_id: job.job_id,
            company: if job.company.is_empty() {
                job.slug.clone()
            } else {
                job.company
            },
            slug: job.slug,
            title: job.title,
            status: job.status,
            message: job.message,
            files: job.files,
            resume_file: job.resume_file,
            cover_letter_file: job.cover_letter_file,
        })
        .collect();
    Json(summaries)
}

/// Resolves a path-supplied job id. Anything that is not the id of a known
/// job — including a string that is not a UUID at all — is the same 404 to
/// the client.
pub fn lookup_job(state: &AppState, job_id: &str) -> Result<crate::store::Job, AppError> {
    Uuid::parse_str(job_id)
        .ok()
        .and_then(|id| state.store.get(id))
        .ok_or_else(AppError::job_not_found)
}

async fn read_template(state: &AppState, name: &str) -> Result<String, AppError> {
    let path = state.config.project_root.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AppError::Template(format!("Failed to read {name}: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
