//! Per-org scheduled task state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operational state of one scheduled task for one org.
///
/// Unique per `(org, task_key)`. Mutated exclusively by the job runner
/// around each execution; read by monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskState {
    pub id: Uuid,
    pub org_id: Uuid,
    pub task_key: String,
    pub started_on: Option<DateTime<Utc>>,
    pub ended_on: Option<DateTime<Utc>>,
    /// Start time of the most recent successful run.
    pub last_successfully_started_on: Option<DateTime<Utc>>,
    /// Serialized payload from the last run.
    pub last_results: Option<serde_json::Value>,
    pub is_failing: bool,
    pub is_disabled: bool,
}

impl TaskState {
    /// Started but not yet ended.
    pub fn is_running(&self) -> bool {
        self.started_on.is_some() && self.ended_on.is_none()
    }

    pub fn has_ever_run(&self) -> bool {
        self.started_on.is_some()
    }

    /// Seconds from the last start until the last end, or until `now`
    /// for a run still in flight. `None` if the task never ran.
    pub fn time_taken(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.started_on?;
        let until = self.ended_on.unwrap_or(now);
        Some((until - started).num_milliseconds() as f64 / 1000.0)
    }
}

/// One completed (or failed) execution, as recorded by the job runner.
#[derive(Debug, Clone)]
pub struct TaskRun {
    pub started_on: DateTime<Utc>,
    pub ended_on: DateTime<Utc>,
    pub results: Option<serde_json::Value>,
    pub succeeded: bool,
}
