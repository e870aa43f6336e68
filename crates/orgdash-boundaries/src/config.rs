//! Boundary subsystem configuration.

use std::time::Duration;

/// Task key under which sweep runs are recorded, and the name of the
/// lock serializing them.
pub const BUILD_BOUNDARIES_TASK: &str = "build_boundaries";

/// What the sweep does when one org's rebuild fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, record it in the org's task state, move on.
    #[default]
    SkipAndContinue,
    /// Record the failure and abort the sweep.
    FailFast,
}

#[derive(Debug, Clone)]
pub struct BoundaryConfig {
    /// Lifetime of a cached snapshot.
    pub cache_ttl: Duration,
    /// Lease on the sweep lock. A sweep outliving its lease loses
    /// mutual exclusion.
    pub lock_lease: Duration,
    pub lock_name: String,
    pub failure_policy: FailurePolicy,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60 * 60 * 24 * 30),
            lock_lease: Duration::from_secs(60 * 15),
            lock_name: BUILD_BOUNDARIES_TASK.to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }
}
