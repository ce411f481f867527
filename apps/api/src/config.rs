use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the resume project: holds `resume.tex`, `cover-letter.tex`,
    /// the per-job `jobs/` tree, and `applications.csv`.
    pub project_root: PathBuf,
    /// Path to the prompt template with `{{...}}` placeholders.
    pub prompt_template: PathBuf,
    /// Directory holding `dashboard.html` and `review.html`.
    pub assets_dir: PathBuf,
    /// Binary invoked for document generation (overridable for tests).
    pub claude_bin: String,
    /// Binary invoked for PDF compilation (overridable for tests).
    pub latexmk_bin: String,
    /// Wall-clock limit for one generation run; the subprocess is killed
    /// on expiry.
    pub generation_timeout: Duration,
    /// Whether to open review pages / PDFs in the local browser.
    pub open_browser: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let project_root = PathBuf::from(require_env("PROJECT_ROOT")?);
        let prompt_template = std::env::var("PROMPT_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("prompt-template.txt"));

        Ok(Config {
            project_root,
            prompt_template,
            assets_dir: std::env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            claude_bin: std::env::var("CLAUDE_BIN").unwrap_or_else(|_| "claude".to_string()),
            latexmk_bin: std::env::var("LATEXMK_BIN").unwrap_or_else(|_| "latexmk".to_string()),
            generation_timeout: Duration::from_secs(
                std::env::var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse::<u64>()
                    .context("GENERATION_TIMEOUT_SECS must be a number of seconds")?,
            ),
            open_browser: std::env::var("OPEN_BROWSER")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3847".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Per-job working directory under the project root.
    pub fn job_dir(&self, slug: &str) -> PathBuf {
        self.project_root.join("jobs").join(slug)
    }

    /// Path of the application-tracking CSV.
    pub fn csv_path(&self) -> PathBuf {
        self.project_root.join("applications.csv")
    }

    /// Path of the job store's backing JSON file.
    pub fn jobs_path(&self) -> PathBuf {
        self.project_root.join("jobs.json")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
