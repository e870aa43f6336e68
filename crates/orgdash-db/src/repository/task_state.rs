//! SurrealDB implementation of [`TaskStateRepository`].

use chrono::{DateTime, Utc};
use orgdash_core::error::OrgResult;
use orgdash_core::models::task_state::{TaskRun, TaskState};
use orgdash_core::repository::TaskStateRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TaskStateRowWithId {
    record_id: String,
    org_id: String,
    task_key: String,
    started_on: Option<DateTime<Utc>>,
    ended_on: Option<DateTime<Utc>>,
    last_successfully_started_on: Option<DateTime<Utc>>,
    last_results: Option<String>,
    is_failing: bool,
    is_disabled: bool,
}

impl TaskStateRowWithId {
    fn try_into_task_state(self) -> Result<TaskState, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let org_id = Uuid::parse_str(&self.org_id)
            .map_err(|e| DbError::Query(format!("invalid org UUID: {e}")))?;
        let last_results = self
            .last_results
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| DbError::Query(format!("invalid task results payload: {e}")))
            })
            .transpose()?;

        Ok(TaskState {
            id,
            org_id,
            task_key: self.task_key,
            started_on: self.started_on,
            ended_on: self.ended_on,
            last_successfully_started_on: self.last_successfully_started_on,
            last_results,
            is_failing: self.is_failing,
            is_disabled: self.is_disabled,
        })
    }
}

/// SurrealDB implementation of the task state repository.
#[derive(Clone)]
pub struct SurrealTaskStateRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskStateRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, task_key: &str) -> Result<Option<TaskState>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_state \
                 WHERE org_id = $org_id AND task_key = $task_key",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("task_key", task_key.to_string()))
            .await?;

        let rows: Vec<TaskStateRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_task_state())
            .transpose()
    }
}

impl<C: Connection> TaskStateRepository for SurrealTaskStateRepository<C> {
    async fn get_or_create(&self, org_id: Uuid, task_key: &str) -> OrgResult<TaskState> {
        if let Some(state) = self.fetch(org_id, task_key).await? {
            return Ok(state);
        }

        let create = self
            .db
            .query(
                "CREATE type::record('task_state', $id) SET \
                 org_id = $org_id, task_key = $task_key, \
                 is_failing = false, is_disabled = false",
            )
            .bind(("id", Uuid::new_v4().to_string()))
            .bind(("org_id", org_id.to_string()))
            .bind(("task_key", task_key.to_string()))
            .await
            .map_err(DbError::from)?
            .check();

        // A concurrent creator may have won the race; the UNIQUE index
        // on (org_id, task_key) rejects the duplicate, and the re-fetch
        // below picks up their record.
        if let Err(e) = create {
            debug!(
                %org_id,
                task_key,
                error = %e,
                "task_state create lost race, re-fetching"
            );
        }

        let state = self.fetch(org_id, task_key).await?;
        state.ok_or_else(|| {
            DbError::NotFound {
                entity: "task_state".into(),
                id: format!("{org_id}/{task_key}"),
            }
            .into()
        })
    }

    async fn get(&self, org_id: Uuid, task_key: &str) -> OrgResult<TaskState> {
        let state = self.fetch(org_id, task_key).await?;
        state.ok_or_else(|| {
            DbError::NotFound {
                entity: "task_state".into(),
                id: format!("{org_id}/{task_key}"),
            }
            .into()
        })
    }

    async fn record_run(&self, org_id: Uuid, task_key: &str, run: TaskRun) -> OrgResult<TaskState> {
        // Ensure the record exists before updating it.
        let existing = self.get_or_create(org_id, task_key).await?;

        let results_str = run
            .results
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()
            .map_err(|e| DbError::Query(format!("failed to serialize task results: {e}")))?;

        let sql = if run.succeeded {
            "UPDATE type::record('task_state', $id) SET \
             started_on = type::datetime($started_on), \
             ended_on = type::datetime($ended_on), \
             last_successfully_started_on = type::datetime($started_on), \
             last_results = $results, \
             is_failing = false"
        } else {
            "UPDATE type::record('task_state', $id) SET \
             started_on = type::datetime($started_on), \
             ended_on = type::datetime($ended_on), \
             last_results = $results, \
             is_failing = true"
        };

        self.db
            .query(sql)
            .bind(("id", existing.id.to_string()))
            .bind(("started_on", run.started_on.to_rfc3339()))
            .bind(("ended_on", run.ended_on.to_rfc3339()))
            .bind(("results", results_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get(org_id, task_key).await
    }

    async fn list_failing(&self) -> OrgResult<Vec<TaskState>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_state \
                 WHERE is_failing = true \
                 AND type::record('org', org_id) IN \
                     (SELECT VALUE id FROM org WHERE is_active = true)",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskStateRowWithId> = result.take(0).map_err(DbError::from)?;
        let states = rows
            .into_iter()
            .map(|row| row.try_into_task_state())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(states)
    }

    async fn set_disabled(&self, org_id: Uuid, task_key: &str, disabled: bool) -> OrgResult<()> {
        let existing = self.get_or_create(org_id, task_key).await?;

        self.db
            .query("UPDATE type::record('task_state', $id) SET is_disabled = $disabled")
            .bind(("id", existing.id.to_string()))
            .bind(("disabled", disabled))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
