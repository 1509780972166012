//! Conversion jobs.
//!
//! A [`ConversionJob`] tracks one (simulated) conversion of a video into audio.
//! Jobs are values: every update produces a new job through
//! [`ConversionJob::advanced`] and the tracker swaps it in whole.

mod driver;
mod tracker;

pub use driver::{ProgressDriver, SimulatedDriver, Step};
pub use tracker::{JobTracker, HISTORY_KEY};

use crate::video::VideoRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Progress value of a finished job.
pub const COMPLETE: f64 = 100.0;

/// Unique identifier of a conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Derive a job id from the record id and the creation time.
    pub fn new(record_id: &str, created_at: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", record_id, created_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One conversion of a video into an audio artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionJob {
    pub id: JobId,
    /// The video being converted.
    #[serde(rename = "video")]
    pub record: Arc<VideoRecord>,
    pub status: JobStatus,
    /// Percentage in [0, 100].
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    /// Reason for a failed conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionJob {
    /// A fresh job at 0% progress.
    pub fn new(record: Arc<VideoRecord>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(&record.id, created_at),
            record,
            status: JobStatus::Processing,
            progress: 0.0,
            created_at,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The job after applying one driver step.
    ///
    /// Terminal jobs are returned unchanged. Progress never decreases, and a
    /// value at or above 100 completes the job at exactly 100.
    pub fn advanced(&self, step: &Step) -> ConversionJob {
        if self.is_terminal() {
            return self.clone();
        }

        let mut next = self.clone();
        match step {
            Step::Progress(value) if value.is_nan() => {}
            Step::Progress(value) if *value >= COMPLETE => {
                next.progress = COMPLETE;
                next.status = JobStatus::Completed;
            }
            Step::Progress(value) => {
                next.progress = value.max(self.progress).max(0.0);
            }
            Step::Completed => {
                next.progress = COMPLETE;
                next.status = JobStatus::Completed;
            }
            Step::Failed(reason) => {
                next.status = JobStatus::Failed;
                next.error = Some(reason.clone());
            }
        }
        next
    }
}
