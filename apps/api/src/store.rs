//! Job Store — the sole source of truth for job status.
//!
//! An in-memory map of job records mirrored to a flat JSON file after every
//! mutation (whole-file rewrite, not an append log). A missing or corrupt
//! file at startup means an empty store: logged, never fatal.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle state of a job. Transitions are monotonic:
/// `processing → review | error`, `review → complete | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Review,
    Complete,
    Error,
}

impl JobStatus {
    /// The edges of the state machine. Re-setting the current status is
    /// allowed (message refresh); `complete` and `error` are terminal.
    fn can_transition(self, to: JobStatus) -> bool {
        self == to
            || matches!(
                (self, to),
                (JobStatus::Processing, JobStatus::Review)
                    | (JobStatus::Processing, JobStatus::Error)
                    | (JobStatus::Review, JobStatus::Complete)
                    | (JobStatus::Review, JobStatus::Error)
            )
    }
}

/// One resume/cover-letter generation request, tracked end-to-end.
///
/// The posting description is deliberately absent: it goes into the prompt
/// and the job directory's `job-description.txt`, never onto the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    pub slug: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    pub status: JobStatus,
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub resume_file: Option<String>,
    #[serde(default)]
    pub cover_letter_file: Option<String>,
    #[serde(default)]
    pub email_draft: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(company: String, title: String, link: String, slug: String) -> Self {
        Job {
            job_id: Uuid::new_v4(),
            slug,
            company,
            title,
            link,
            status: JobStatus::Processing,
            message: "Claude is generating tailored documents...".to_string(),
            files: Vec::new(),
            resume_file: None,
            cover_letter_file: None,
            email_draft: None,
            created_at: Utc::now(),
        }
    }

    /// Sets a new status, refusing anything that is not an edge of the
    /// state machine. Returns false (and leaves the job untouched) on a
    /// refused transition.
    pub fn transition(&mut self, status: JobStatus, message: String) -> bool {
        if !self.status.can_transition(status) {
            return false;
        }
        self.status = status;
        self.message = message;
        true
    }
}

/// Narrow get/insert/update/list interface over the process-wide job map.
/// Callers never touch the map or the backing file directly, so the backing
/// can later be swapped for a transactional store without touching them.
#[derive(Clone)]
pub struct JobStore {
    path: PathBuf,
    jobs: Arc<Mutex<HashMap<Uuid, Job>>>,
}

impl JobStore {
    /// Loads the store from `path`. Missing or unparseable file ⇒ empty store.
    pub fn load(path: PathBuf) -> Self {
        let jobs = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Vec<Job>>(&text) {
                Ok(list) => {
                    info!("Loaded {} jobs from {}", list.len(), path.display());
                    list.into_iter().map(|j| (j.job_id, j)).collect()
                }
                Err(e) => {
                    warn!("Failed to parse {}: {e}; starting empty", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        JobStore {
            path,
            jobs: Arc::new(Mutex::new(jobs)),
        }
    }

    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.jobs.lock().expect("job map poisoned").get(&job_id).cloned()
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Vec<Job> {
        let mut list: Vec<Job> = self
            .jobs
            .lock()
            .expect("job map poisoned")
            .values()
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().expect("job map poisoned").len()
    }

    pub async fn insert(&self, job: Job) {
        self.jobs
            .lock()
            .expect("job map poisoned")
            .insert(job.job_id, job);
        self.persist().await;
    }

    /// Applies `mutate` to the record for `job_id` (no-op if absent) and
    /// rewrites the backing file.
    pub async fn update(&self, job_id: Uuid, mutate: impl FnOnce(&mut Job)) {
        {
            let mut jobs = self.jobs.lock().expect("job map poisoned");
            match jobs.get_mut(&job_id) {
                Some(job) => mutate(job),
                None => {
                    warn!("Update for unknown job {job_id} ignored");
                    return;
                }
            }
        }
        self.persist().await;
    }

    /// Convenience wrapper for status changes; warns on refused
    /// transitions.
    pub async fn set_status(&self, job_id: Uuid, status: JobStatus, message: impl Into<String>) {
        let message = message.into();
        self.update(job_id, |job| {
            if !job.transition(status, message) {
                warn!(
                    "Refused invalid transition {:?} → {:?} for job {job_id}",
                    job.status, status
                );
            }
        })
        .await;
    }

    /// Rewrites the entire backing file from the current map. Failure is
    /// logged and absorbed; the in-memory map stays authoritative.
    async fn persist(&self) {
        let snapshot = {
            let jobs = self.jobs.lock().expect("job map poisoned");
            let mut list: Vec<Job> = jobs.values().cloned().collect();
            list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            list
        };

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize job store: {e}");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(&self.path, json).await {
            warn!("Failed to write {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job::new(
            "Acme Corp".to_string(),
            "Engineer".to_string(),
            "https://example.com/posting".to_string(),
            "acme-corp".to_string(),
        )
    }

    #[tokio::test]
    async fn test_round_trip_through_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");

        let store = JobStore::load(path.clone());
        let mut job = sample_job();
        job.files = vec!["resume-acme-corp.tex".to_string()];
        job.email_draft = Some("Hello".to_string());
        let id = job.job_id;
        store.insert(job.clone()).await;

        // Simulate a process restart.
        let reloaded = JobStore::load(path);
        let recovered = reloaded.get(id).expect("job survives reload");
        assert_eq!(recovered.job_id, job.job_id);
        assert_eq!(recovered.slug, job.slug);
        assert_eq!(recovered.company, job.company);
        assert_eq!(recovered.title, job.title);
        assert_eq!(recovered.link, job.link);
        assert_eq!(recovered.status, job.status);
        assert_eq!(recovered.message, job.message);
        assert_eq!(recovered.files, job.files);
        assert_eq!(recovered.resume_file, job.resume_file);
        assert_eq!(recovered.cover_letter_file, job.cover_letter_file);
        assert_eq!(recovered.email_draft, job.email_draft);
    }

    #[tokio::test]
    async fn test_corrupt_backing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, "not json{{{").unwrap();

        let store = JobStore::load(path);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_backing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::load(dir.path().join("jobs.json"));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::load(dir.path().join("jobs.json"));

        let mut first = sample_job();
        first.created_at = Utc::now() - chrono::Duration::seconds(10);
        let mut second = sample_job();
        second.company = "Beta Inc".to_string();
        let second_id = second.job_id;

        store.insert(first).await;
        store.insert(second).await;

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].job_id, second_id);
    }

    #[tokio::test]
    async fn test_status_never_regresses_to_processing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::load(dir.path().join("jobs.json"));
        let job = sample_job();
        let id = job.job_id;
        store.insert(job).await;

        store.set_status(id, JobStatus::Review, "ready").await;
        store
            .set_status(id, JobStatus::Processing, "should be refused")
            .await;

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Review);
        assert_eq!(job.message, "ready");
    }

    #[tokio::test]
    async fn test_terminal_statuses_refuse_further_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::load(dir.path().join("jobs.json"));
        let job = sample_job();
        let id = job.job_id;
        store.insert(job).await;

        store.set_status(id, JobStatus::Review, "ready").await;
        store.set_status(id, JobStatus::Complete, "done").await;
        store.set_status(id, JobStatus::Error, "too late").await;

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.message, "done");
    }

    #[test]
    fn test_only_state_machine_edges_are_accepted() {
        let mut job = sample_job();
        // processing → complete skips review.
        assert!(!job.transition(JobStatus::Complete, "skip".to_string()));
        assert!(job.transition(JobStatus::Error, "failed".to_string()));
        // error is terminal.
        assert!(!job.transition(JobStatus::Review, "revive".to_string()));
        assert_eq!(job.status, JobStatus::Error);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Review).unwrap(),
            "\"review\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Complete).unwrap(),
            "\"complete\""
        );
        assert_eq!(serde_json::to_string(&JobStatus::Error).unwrap(), "\"error\"");
    }
}
