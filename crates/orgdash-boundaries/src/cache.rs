//! Boundary cache reads and rebuilds.

use std::collections::BTreeMap;

use chrono::Utc;
use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::boundary::{
    BoundaryLevel, BoundaryRecord, CachedBoundaries, FeatureCollection,
};
use orgdash_core::models::org::Org;
use orgdash_core::ports::{BoundarySource, CacheStore, Job, JobQueue};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::BoundaryConfig;
use crate::keys;

/// Read-through boundary cache.
///
/// Reads never block on a rebuild: a miss (or expired entry) enqueues
/// a rebuild job and returns `None`, and callers render without
/// boundary data until the snapshot lands.
pub struct BoundaryCache<C: CacheStore, Q: JobQueue> {
    cache: C,
    queue: Q,
    config: BoundaryConfig,
}

impl<C: CacheStore, Q: JobQueue> BoundaryCache<C, Q> {
    pub fn new(cache: C, queue: Q, config: BoundaryConfig) -> Self {
        Self {
            cache,
            queue,
            config,
        }
    }

    /// The org's cached snapshot, or `None` after scheduling a
    /// rebuild.
    pub async fn get_boundaries(&self, org_id: Uuid) -> OrgResult<Option<CachedBoundaries>> {
        let key = keys::org_boundaries(org_id);

        if let Some(raw) = self.cache.get(&key).await? {
            match serde_json::from_str::<CachedBoundaries>(&raw) {
                Ok(snapshot) => return Ok(Some(snapshot)),
                Err(e) => {
                    // Treat a corrupt entry as a miss; the rebuild
                    // overwrites it.
                    warn!(%org_id, error = %e, "Discarding unreadable boundary snapshot");
                }
            }
        }

        debug!(%org_id, "Boundary cache miss, scheduling rebuild");
        self.queue
            .enqueue(Job::RebuildBoundaries { org_id })
            .await?;
        Ok(None)
    }

    /// The level-1 (states) collection, if cached.
    pub async fn get_top_level(&self, org_id: Uuid) -> OrgResult<Option<FeatureCollection>> {
        let snapshot = self.get_boundaries(org_id).await?;
        Ok(snapshot.and_then(|s| s.results.get(&keys::top_level(org_id)).cloned()))
    }

    /// The level-2 (districts) collection under one state, if cached.
    pub async fn get_second_level(
        &self,
        org_id: Uuid,
        parent_id: &str,
    ) -> OrgResult<Option<FeatureCollection>> {
        let snapshot = self.get_boundaries(org_id).await?;
        Ok(snapshot.and_then(|s| {
            s.results
                .get(&keys::second_level(org_id, parent_id))
                .cloned()
        }))
    }

    /// Ids of all cached level-1 boundaries.
    pub async fn get_top_level_ids(&self, org_id: Uuid) -> OrgResult<Option<Vec<String>>> {
        let top = self.get_top_level(org_id).await?;
        Ok(top.map(|collection| {
            collection
                .features
                .iter()
                .map(|f| f.properties.id.clone())
                .collect()
        }))
    }

    /// Fetch the org's boundaries and overwrite its cache entry.
    ///
    /// Last write wins; concurrent builds converge on whichever
    /// finishes last, which is fine because both built from the same
    /// upstream.
    pub async fn build_boundaries<S: BoundarySource>(
        &self,
        org: &Org,
        source: &S,
    ) -> OrgResult<CachedBoundaries> {
        let records = source.get_boundaries().await?;

        let snapshot = CachedBoundaries {
            time: Utc::now().timestamp_millis(),
            results: partition(org.id, &records),
        };

        let raw = serde_json::to_string(&snapshot)
            .map_err(|e| OrgError::Cache(format!("failed to serialize snapshot: {e}")))?;
        self.cache
            .set(&keys::org_boundaries(org.id), raw, self.config.cache_ttl)
            .await?;

        debug!(
            org = %org.name,
            records = records.len(),
            collections = snapshot.results.len(),
            "Boundary snapshot rebuilt"
        );

        Ok(snapshot)
    }
}

/// Partition flat records into one states collection plus one
/// districts collection per parent state.
fn partition(org_id: Uuid, records: &[BoundaryRecord]) -> BTreeMap<String, FeatureCollection> {
    let mut states = Vec::new();
    let mut districts: BTreeMap<&str, Vec<&BoundaryRecord>> = BTreeMap::new();

    for record in records {
        match record.level {
            BoundaryLevel::State => states.push(record),
            BoundaryLevel::District => match record.parent_id.as_deref() {
                Some(parent) => districts.entry(parent).or_default().push(record),
                None => {
                    warn!(
                        boundary_id = %record.boundary_id,
                        "District without a parent state, skipping"
                    );
                }
            },
        }
    }

    let mut results = BTreeMap::new();
    results.insert(
        keys::top_level(org_id),
        FeatureCollection::from_records(states),
    );
    for (parent, group) in districts {
        results.insert(
            keys::second_level(org_id, parent),
            FeatureCollection::from_records(group),
        );
    }

    results
}
