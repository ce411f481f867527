//! Generation pipeline — spawns the AI CLI for a job and post-processes its
//! output into the job directory.
//!
//! Runs on a detached task after `/generate` has already answered; every
//! outcome lands on the job record, never back on an HTTP response.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::generation::output::{parse_output, GeneratedFile};
use crate::state::AppState;
use crate::store::JobStatus;

/// Agentic turn limit passed to the CLI.
const MAX_TURNS: &str = "10";
/// Stderr is truncated to this many characters on the job message.
const STDERR_LIMIT: usize = 500;
/// Raw CLI stdout is always saved here for manual recovery.
const RAW_OUTPUT_FILE: &str = "claude-raw-output.txt";

/// Runs the AI CLI for `job_id` and moves the job to `review` or `error`.
pub async fn run_generation(state: AppState, job_id: Uuid, slug: String, prompt: String) {
    let job_dir = state.config.job_dir(&slug);

    let mut command = Command::new(&state.config.claude_bin);
    command
        .args(["--print", "--output-format", "text", "--max-turns", MAX_TURNS, "-p", prompt.as_str()])
        .current_dir(&state.config.project_root)
        .env_remove("CLAUDECODE")
        .kill_on_drop(true);

    let output = match timeout(state.config.generation_timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            error!("[{job_id}] Failed to spawn {}: {e}", state.config.claude_bin);
            state
                .store
                .set_status(job_id, JobStatus::Error, format!("Failed to spawn Claude CLI: {e}"))
                .await;
            return;
        }
        Err(_) => {
            // Dropping the output future kills the child (kill_on_drop).
            let message = format!(
                "Claude process timed out after {} seconds",
                state.config.generation_timeout.as_secs()
            );
            error!("[{job_id}] {message}");
            state.store.set_status(job_id, JobStatus::Error, message).await;
            return;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let truncated: String = stderr.chars().take(STDERR_LIMIT).collect();
        error!("[{job_id}] Claude exited with code {code}: {truncated}");
        state
            .store
            .set_status(
                job_id,
                JobStatus::Error,
                format!("Claude exited with code {code}: {truncated}"),
            )
            .await;
        return;
    }

    // Keep the raw transcript regardless of parse outcome.
    if let Err(e) = tokio::fs::write(job_dir.join(RAW_OUTPUT_FILE), stdout.as_bytes()).await {
        warn!("[{job_id}] Failed to save raw output: {e}");
    }

    let files = parse_output(&stdout);
    if files.is_empty() {
        state
            .store
            .set_status(
                job_id,
                JobStatus::Error,
                "Claude produced no parseable files. Raw output saved to job directory.",
            )
            .await;
        return;
    }

    let written = match write_files(&job_dir, &files).await {
        Ok(written) => written,
        Err(e) => {
            error!("[{job_id}] Failed to write generated files: {e}");
            state
                .store
                .set_status(job_id, JobStatus::Error, format!("Failed to write generated files: {e}"))
                .await;
            return;
        }
    };

    let email_draft = files
        .iter()
        .find(|f| f.filename == "email-draft.md")
        .map(|f| f.content.clone());

    let resume_file = crate::review::resume_tex(&slug);
    let cover_letter_file = crate::review::cover_letter_tex(&slug);
    state
        .store
        .update(job_id, |job| {
            job.transition(
                JobStatus::Review,
                "Documents generated. Open review page to edit and compile.".to_string(),
            );
            job.files = written;
            job.resume_file = Some(resume_file);
            job.cover_letter_file = Some(cover_letter_file);
            job.email_draft = email_draft;
        })
        .await;

    let review_url = format!(
        "http://localhost:{}/review?id={job_id}",
        state.config.port
    );
    info!("[{job_id}] Ready for review: {review_url}");
    if state.config.open_browser {
        // Best-effort: a headless or browserless host is not an error.
        let _ = open::that_detached(&review_url);
    }
}

/// Writes each parsed block into the job directory, returning the filenames
/// in write order.
async fn write_files(job_dir: &Path, files: &[GeneratedFile]) -> std::io::Result<Vec<String>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path: PathBuf = job_dir.join(&file.filename);
        tokio::fs::write(&path, &file.content).await?;
        info!("Wrote {}", path.display());
        written.push(file.filename.clone());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Job, JobStore};

    fn test_config(root: &Path, claude_bin: &str) -> Config {
        Config {
            project_root: root.to_path_buf(),
            prompt_template: root.join("prompt-template.txt"),
            assets_dir: root.join("assets"),
            claude_bin: claude_bin.to_string(),
            latexmk_bin: "latexmk".to_string(),
            generation_timeout: std::time::Duration::from_secs(300),
            open_browser: false,
            port: 3847,
            rust_log: "info".to_string(),
        }
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, body).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    async fn seeded_state(root: &Path, claude_bin: &Path) -> (AppState, Uuid, String) {
        let store = JobStore::load(root.join("jobs.json"));
        let job = Job::new(
            "Acme".to_string(),
            "Engineer".to_string(),
            String::new(),
            "acme".to_string(),
        );
        let job_id = job.job_id;
        let slug = job.slug.clone();
        store.insert(job).await;
        std::fs::create_dir_all(root.join("jobs").join(&slug)).unwrap();
        let state = AppState::new(store, test_config(root, &claude_bin.to_string_lossy()));
        (state, job_id, slug)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_moves_job_to_review() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-claude");
        write_script(
            &script,
            "#!/bin/sh\n\
             cat <<'EOF'\n\
             ===FILE: resume-acme.tex===\n\
             tailored resume\n\
             ===END FILE===\n\
             ===FILE: cover-letter-acme.tex===\n\
             tailored letter\n\
             ===END FILE===\n\
             ===FILE: email-draft.md===\n\
             Hi there\n\
             ===END FILE===\n\
             EOF\n",
        );

        let (state, job_id, slug) = seeded_state(dir.path(), &script).await;
        run_generation(state.clone(), job_id, slug.clone(), "prompt".to_string()).await;

        let job = state.store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Review);
        assert_eq!(
            job.files,
            vec!["resume-acme.tex", "cover-letter-acme.tex", "email-draft.md"]
        );
        assert_eq!(job.resume_file.as_deref(), Some("resume-acme.tex"));
        assert_eq!(job.cover_letter_file.as_deref(), Some("cover-letter-acme.tex"));
        assert_eq!(job.email_draft.as_deref(), Some("Hi there\n"));

        let job_dir = state.config.job_dir(&slug);
        assert_eq!(
            std::fs::read_to_string(job_dir.join("resume-acme.tex")).unwrap(),
            "tailored resume\n"
        );
        assert!(job_dir.join("claude-raw-output.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process_and_marks_job_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-claude");
        // Sleeps far past the configured limit; the timeout must win.
        write_script(&script, "#!/bin/sh\nsleep 30\n");

        let (mut state, job_id, slug) = seeded_state(dir.path(), &script).await;
        state.config.generation_timeout = std::time::Duration::from_millis(200);
        run_generation(state.clone(), job_id, slug, "prompt".to_string()).await;

        let job = state.store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.message.contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_marks_job_error_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-claude");
        write_script(&script, "#!/bin/sh\necho 'credit balance too low' >&2\nexit 1\n");

        let (state, job_id, slug) = seeded_state(dir.path(), &script).await;
        run_generation(state.clone(), job_id, slug, "prompt".to_string()).await;

        let job = state.store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.message.contains("exited with code 1"));
        assert!(job.message.contains("credit balance too low"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_parseable_files_is_an_error_despite_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-claude");
        write_script(&script, "#!/bin/sh\necho 'I could not find any templates'\n");

        let (state, job_id, slug) = seeded_state(dir.path(), &script).await;
        run_generation(state.clone(), job_id, slug.clone(), "prompt".to_string()).await;

        let job = state.store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.message.contains("no parseable files"));

        // Raw output is preserved for manual recovery.
        let raw = std::fs::read_to_string(state.config.job_dir(&slug).join("claude-raw-output.txt"))
            .unwrap();
        assert!(raw.contains("could not find any templates"));
    }
}
