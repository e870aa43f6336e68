//! Periodic boundary refresh sweep.

use chrono::Utc;
use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::boundary::CachedBoundaries;
use orgdash_core::models::org::Org;
use orgdash_core::models::task_state::TaskRun;
use orgdash_core::ports::{BoundaryClientFactory, CacheStore, JobQueue, LockProvider};
use orgdash_core::repository::{OrgRepository, TaskStateRepository};
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cache::BoundaryCache;
use crate::config::{BUILD_BOUNDARIES_TASK, BoundaryConfig, FailurePolicy};
use crate::keys;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// The whole sweep was skipped because the lock was held.
    pub skipped: bool,
    pub rebuilt: usize,
    pub failed: usize,
}

impl SweepSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            rebuilt: 0,
            failed: 0,
        }
    }
}

/// Rebuilds every active org's boundary snapshot under a shared lock.
///
/// Each rebuild is recorded in the org's task state under the
/// `build_boundaries` key, so monitoring sees per-org failures even
/// when the sweep as a whole continues.
pub struct BoundaryRefresher<O, F, T, L, C, Q>
where
    O: OrgRepository,
    F: BoundaryClientFactory,
    T: TaskStateRepository,
    L: LockProvider,
    C: CacheStore,
    Q: JobQueue,
{
    orgs: O,
    factory: F,
    tasks: T,
    lock: L,
    cache: BoundaryCache<C, Q>,
    config: BoundaryConfig,
}

impl<O, F, T, L, C, Q> BoundaryRefresher<O, F, T, L, C, Q>
where
    O: OrgRepository,
    F: BoundaryClientFactory,
    T: TaskStateRepository,
    L: LockProvider,
    C: CacheStore,
    Q: JobQueue,
{
    pub fn new(
        orgs: O,
        factory: F,
        tasks: T,
        lock: L,
        cache: BoundaryCache<C, Q>,
        config: BoundaryConfig,
    ) -> Self {
        Self {
            orgs,
            factory,
            tasks,
            lock,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &BoundaryCache<C, Q> {
        &self.cache
    }

    /// Rebuild all active orgs' snapshots.
    ///
    /// A sweep already running elsewhere (lock held) turns this into a
    /// no-op. The lease is not renewed mid-sweep; a sweep outliving it
    /// loses mutual exclusion.
    pub async fn sweep(&self) -> OrgResult<SweepSummary> {
        let Some(_guard) = self
            .lock
            .try_acquire(&self.config.lock_name, self.config.lock_lease)
            .await?
        else {
            debug!("Boundary sweep already running, skipping");
            return Ok(SweepSummary::skipped());
        };

        let sweep_started = std::time::Instant::now();
        let orgs = self.orgs.list_active().await?;
        let total = orgs.len();

        let mut rebuilt = 0;
        let mut failed = 0;

        for org in &orgs {
            let state = self
                .tasks
                .get_or_create(org.id, BUILD_BOUNDARIES_TASK)
                .await?;
            if state.is_disabled {
                debug!(org = %org.name, "Boundary task disabled, skipping org");
                continue;
            }

            match self.rebuild_and_record(org).await? {
                None => rebuilt += 1,
                Some(e) => {
                    failed += 1;
                    match self.config.failure_policy {
                        FailurePolicy::SkipAndContinue => {
                            warn!(org = %org.name, error = %e, "Boundary rebuild failed, continuing");
                        }
                        FailurePolicy::FailFast => {
                            error!(org = %org.name, error = %e, "Boundary rebuild failed, aborting sweep");
                            return Err(e);
                        }
                    }
                }
            }
        }

        info!(
            elapsed_secs = sweep_started.elapsed().as_secs_f64(),
            rebuilt, failed, total, "Boundary sweep complete"
        );

        Ok(SweepSummary {
            skipped: false,
            rebuilt,
            failed,
        })
    }

    /// Rebuild one org's snapshot, for handling a single rebuild job.
    /// Inactive orgs are left alone.
    pub async fn rebuild_org(&self, org_id: Uuid) -> OrgResult<Option<CachedBoundaries>> {
        let org = self.orgs.get_by_id(org_id).await?;
        if !org.is_active {
            debug!(org = %org.name, "Org inactive, not rebuilding boundaries");
            return Ok(None);
        }

        match self.rebuild_and_record(&org).await? {
            None => Ok(self.cache.get_boundaries(org.id).await?),
            Some(e) => Err(e),
        }
    }

    /// Rebuild one org and record the run in its task state either
    /// way. Returns the rebuild error (if any) without propagating it,
    /// so the caller applies its failure policy; bookkeeping errors
    /// propagate directly.
    async fn rebuild_and_record(&self, org: &Org) -> OrgResult<Option<OrgError>> {
        let started = Utc::now();
        let outcome = match self.factory.client_for(org) {
            Ok(client) => self.cache.build_boundaries(org, &client).await,
            Err(e) => Err(e),
        };
        let ended = Utc::now();

        let (results, succeeded) = match &outcome {
            Ok(snapshot) => {
                let (states, districts) = feature_counts(org.id, snapshot);
                (json!({"states": states, "districts": districts}), true)
            }
            Err(e) => (json!({"error": e.to_string()}), false),
        };

        self.tasks
            .record_run(
                org.id,
                BUILD_BOUNDARIES_TASK,
                TaskRun {
                    started_on: started,
                    ended_on: ended,
                    results: Some(results),
                    succeeded,
                },
            )
            .await?;

        Ok(outcome.err())
    }
}

fn feature_counts(org_id: Uuid, snapshot: &CachedBoundaries) -> (usize, usize) {
    let top_key = keys::top_level(org_id);
    let states = snapshot
        .results
        .get(&top_key)
        .map(|c| c.features.len())
        .unwrap_or(0);
    let districts = snapshot
        .results
        .iter()
        .filter(|(key, _)| **key != top_key)
        .map(|(_, c)| c.features.len())
        .sum();
    (states, districts)
}
