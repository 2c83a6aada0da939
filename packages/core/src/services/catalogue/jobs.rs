//! Scheduled-job status reporting.
//!
//! Jobs that run on a schedule record their outcome in the catalogue's
//! `scheduled-jobs` table. The job's identity and collected errors come from
//! a [`JobContext`] passed by the caller.

use std::env;

use chrono::Utc;
use serde_json::Value;

use super::client::{CatalogueClient, SCHEDULED_JOBS};
use super::types::{ScheduledJobUpdate, DOCUMENT_ID};

/// Status value that marks a successful run.
pub const SUCCEEDED: &str = "Succeeded";

/// What the reporter needs to know about the running job.
pub trait JobContext: Send + Sync {
    fn name(&self) -> &str;

    fn error_messages(&self) -> &[String];

    /// Whether `status` counts as a successful run.
    fn is_success(&self, status: &str) -> bool {
        status == SUCCEEDED
    }
}

/// Job context that accumulates error messages during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub error_messages: Vec<String>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_messages: Vec::new(),
        }
    }

    /// Job named by `JOB_NAME`, or `unknown` when unset.
    pub fn from_env() -> Self {
        Self::new(env::var("JOB_NAME").unwrap_or_else(|_| "unknown".to_string()))
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_messages.push(message.into());
    }
}

impl JobContext for Job {
    fn name(&self) -> &str {
        if self.name.is_empty() {
            "unknown"
        } else {
            &self.name
        }
    }

    fn error_messages(&self) -> &[String] {
        &self.error_messages
    }
}

/// Fields to write for a run that ended with `status`.
pub fn build_job_update(status: &str, job: &dyn JobContext) -> ScheduledJobUpdate {
    let now = Utc::now().to_rfc3339();
    if job.is_success(status) {
        ScheduledJobUpdate {
            result: status.to_string(),
            last_scheduled_run: now.clone(),
            last_successful_run: Some(now),
            error_details: None,
        }
    } else {
        let errors = job.error_messages();
        ScheduledJobUpdate {
            result: status.to_string(),
            last_scheduled_run: now,
            last_successful_run: None,
            error_details: (!errors.is_empty()).then(|| errors.to_vec()),
        }
    }
}

impl CatalogueClient {
    /// Record the outcome of `job` in its `scheduled-jobs` entry.
    ///
    /// Returns `false` without writing when the job has no record (or the
    /// record has no `documentId`), and `false` when the write fails.
    pub async fn update_scheduled_job(&self, status: &str, job: &dyn JobContext) -> bool {
        let job_name = job.name();
        let Some(record) = self.get_record(SCHEDULED_JOBS, "name", job_name).await else {
            tracing::error!("Job {} not found in Service Catalogue", job_name);
            return false;
        };

        let Some(document_id) = record.get(DOCUMENT_ID).and_then(Value::as_str) else {
            tracing::error!("Job {} has no documentId", job_name);
            return false;
        };

        let update = build_job_update(status, job);
        let updated = self.update(SCHEDULED_JOBS, document_id, &update).await;
        if !updated {
            tracing::error!("Failed to record status {} for job {}", status, job_name);
        }
        updated
    }
}
