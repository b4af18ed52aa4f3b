//! In-memory progress tracking for long-running jobs.
//!
//! Clients poll a job by id while transcription or rendering runs.
//! Finished jobs are forgotten once they are older than the retention
//! period.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Coarse job phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Started,
    Uploading,
    Processing,
    Transcribing,
    Encoding,
    Completed,
    Error,
}

impl JobState {
    pub fn is_finished(self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

/// A snapshot of one job's progress.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub status: JobState,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// How long a finished job stays pollable.
const DEFAULT_RETENTION_MINUTES: i64 = 60;

/// Thread-safe map of job id to latest status.
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, JobStatus>>,
    retention: Duration,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::with_retention(Duration::minutes(DEFAULT_RETENTION_MINUTES))
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Record the latest status of a job, creating it if needed.
    pub fn update(&self, id: Uuid, status: JobState, progress: u8, message: impl Into<String>) {
        let message = message.into();
        debug!(job = %id, ?status, progress, "{}", message);

        let now = Utc::now();
        let entry = JobStatus {
            status,
            progress: progress.min(100),
            message,
            timestamp: now,
        };

        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_finished() && now - job.timestamp >= self.retention));
        if jobs.len() < before {
            debug!("Evicted {} finished jobs", before - jobs.len());
        }
        jobs.insert(id, entry);
    }

    pub fn fail(&self, id: Uuid, message: impl Into<String>) {
        self.update(id, JobState::Error, 0, message);
    }

    pub fn get(&self, id: &Uuid) -> Option<JobStatus> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_get() {
        let jobs = JobRegistry::new();
        let id = Uuid::new_v4();
        assert!(jobs.get(&id).is_none());

        jobs.update(id, JobState::Transcribing, 30, "Transcribing audio");
        let status = jobs.get(&id).unwrap();
        assert_eq!(status.status, JobState::Transcribing);
        assert_eq!(status.progress, 30);

        jobs.update(id, JobState::Completed, 100, "Done");
        assert!(jobs.get(&id).unwrap().status.is_finished());
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn test_finished_jobs_expire() {
        let jobs = JobRegistry::with_retention(Duration::zero());
        let done = Uuid::new_v4();
        let failed = Uuid::new_v4();
        let running = Uuid::new_v4();

        jobs.update(done, JobState::Completed, 100, "Done");
        jobs.fail(failed, "broken");
        jobs.update(running, JobState::Encoding, 40, "Encoding");
        // The next update sweeps out everything finished.
        jobs.update(Uuid::new_v4(), JobState::Started, 0, "Starting");

        assert!(jobs.get(&done).is_none());
        assert!(jobs.get(&failed).is_none());
        assert!(jobs.get(&running).is_some());
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn test_recent_finished_job_is_kept() {
        let jobs = JobRegistry::new();
        let id = Uuid::new_v4();
        jobs.update(id, JobState::Completed, 100, "Done");
        jobs.update(Uuid::new_v4(), JobState::Started, 0, "Starting");
        assert!(jobs.get(&id).is_some());
    }

    #[test]
    fn test_progress_is_capped() {
        let jobs = JobRegistry::new();
        let id = Uuid::new_v4();
        jobs.update(id, JobState::Encoding, 250, "Encoding");
        assert_eq!(jobs.get(&id).unwrap().progress, 100);
    }

    #[test]
    fn test_fail() {
        let jobs = JobRegistry::new();
        let id = Uuid::new_v4();
        jobs.fail(id, "ffmpeg exploded");
        let status = jobs.get(&id).unwrap();
        assert_eq!(status.status, JobState::Error);
        assert_eq!(status.message, "ffmpeg exploded");
    }

    #[test]
    fn test_serializes_lowercase_state() {
        let status = JobStatus {
            status: JobState::Completed,
            progress: 100,
            message: "ok".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn test_concurrent_updates() {
        let jobs = std::sync::Arc::new(JobRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let jobs = jobs.clone();
                std::thread::spawn(move || {
                    jobs.update(Uuid::new_v4(), JobState::Processing, i, "working");
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(jobs.len(), 8);
    }
}
