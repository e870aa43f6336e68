//! Scheduled task state tracking.

use orgdash_core::error::OrgResult;
use orgdash_core::models::task_state::{TaskRun, TaskState};
use orgdash_core::repository::TaskStateRepository;
use tracing::{info, warn};
use uuid::Uuid;

/// Records task executions and exposes failing states for alerting.
///
/// Deliberately thin: timestamps come from the caller, and there is no
/// retry logic here.
pub struct TaskRunner<T: TaskStateRepository> {
    repo: T,
}

impl<T: TaskStateRepository> TaskRunner<T> {
    pub fn new(repo: T) -> Self {
        Self { repo }
    }

    /// Current state for the pair, created on first use.
    pub async fn state(&self, org_id: Uuid, task_key: &str) -> OrgResult<TaskState> {
        self.repo.get_or_create(org_id, task_key).await
    }

    /// Record one completed execution.
    pub async fn record_run(
        &self,
        org_id: Uuid,
        task_key: &str,
        run: TaskRun,
    ) -> OrgResult<TaskState> {
        let elapsed = (run.ended_on - run.started_on).num_milliseconds() as f64 / 1000.0;
        if run.succeeded {
            info!(%org_id, task_key, elapsed_secs = elapsed, "Task run succeeded");
        } else {
            warn!(%org_id, task_key, elapsed_secs = elapsed, "Task run failed");
        }

        self.repo.record_run(org_id, task_key, run).await
    }

    /// Failing task states across all active orgs.
    pub async fn list_failing(&self) -> OrgResult<Vec<TaskState>> {
        self.repo.list_failing().await
    }

    pub async fn set_disabled(
        &self,
        org_id: Uuid,
        task_key: &str,
        disabled: bool,
    ) -> OrgResult<()> {
        self.repo.set_disabled(org_id, task_key, disabled).await
    }
}
