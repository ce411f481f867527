//! Application tracker — the append-only CSV of submitted applications.
//!
//! The file keeps a fixed 7-column header and RFC4180-style quoting: a field
//! is quoted only when it contains a comma, quote, or newline, with embedded
//! quotes doubled.

use std::path::Path;

use anyhow::{Context, Result};
use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::state::AppState;
use crate::store::Job;

pub const CSV_HEADER: &str =
    "Company Name,Application Status,Role,Salary,Date Submitted,Link to Job Req,Rejection Reason";

/// One parsed row of `applications.csv`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplicationRow {
    pub company: String,
    pub status: String,
    pub role: String,
    pub salary: String,
    pub date: String,
    pub link: String,
    pub rejection: String,
}

/// Quotes `value` when it contains a comma, quote, or newline.
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Splits one CSV line into fields, honoring quoting and doubled quotes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut cols = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else if ch == '"' {
                in_quotes = false;
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            cols.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    cols.push(current);
    cols
}

/// Appends a row for a completed job, creating the file with its header
/// first if it does not exist yet.
pub async fn append_application(csv_path: &Path, job: &Job) -> Result<()> {
    let exists = tokio::fs::try_exists(csv_path).await.unwrap_or(false);

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)
        .await
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    if !exists {
        file.write_all(format!("{CSV_HEADER}\n").as_bytes()).await?;
    }

    let company = if job.company.is_empty() {
        &job.slug
    } else {
        &job.company
    };
    let row = [
        csv_escape(company),
        "Applied".to_string(),
        csv_escape(&job.title),
        "0".to_string(),
        Utc::now().format("%Y-%m-%d").to_string(),
        csv_escape(&job.link),
        String::new(),
    ]
    .join(",");

    file.write_all(format!("{row}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Reads the tracker file back into rows; missing or empty file is an empty
/// list, never an error.
pub async fn read_applications(csv_path: &Path) -> Vec<ApplicationRow> {
    let Ok(text) = tokio::fs::read_to_string(csv_path).await else {
        return Vec::new();
    };

    text.trim()
        .lines()
        .skip(1) // header
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut cols = parse_csv_line(line).into_iter();
            let mut next = || cols.next().unwrap_or_default();
            ApplicationRow {
                company: next(),
                status: next(),
                role: next(),
                salary: next(),
                date: next(),
                link: next(),
                rejection: next(),
            }
        })
        .collect()
}

/// GET /api/csv
pub async fn handle_list_applications(State(state): State<AppState>) -> Json<Vec<ApplicationRow>> {
    Json(read_applications(&state.config.csv_path()).await)
}
