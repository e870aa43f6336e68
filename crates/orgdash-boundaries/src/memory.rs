//! In-memory adapters for the cache, lock, and job queue ports.
//!
//! These back single-process deployments and tests. Expiry is based on
//! `tokio::time::Instant`, so tests can drive it with a paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use orgdash_core::error::OrgResult;
use orgdash_core::ports::{CacheStore, Job, JobQueue, LockProvider};
use tokio::time::Instant;

// -----------------------------------------------------------------------
// Cache
// -----------------------------------------------------------------------

/// In-memory [`CacheStore`] with per-entry expiry.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> OrgResult<Option<String>> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => {
                Ok(Some(value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> OrgResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Job queue
// -----------------------------------------------------------------------

/// In-memory [`JobQueue`] that records enqueued jobs. Clones share the
/// same queue.
#[derive(Clone, Default)]
pub struct MemoryJobQueue {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// All jobs enqueued so far, in order.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().expect("queue lock poisoned").clone()
    }

    /// Drain the queue, returning the jobs in order.
    pub fn drain(&self) -> Vec<Job> {
        std::mem::take(&mut *self.jobs.lock().expect("queue lock poisoned"))
    }
}

impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, job: Job) -> OrgResult<()> {
        self.jobs.lock().expect("queue lock poisoned").push(job);
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Lock
// -----------------------------------------------------------------------

struct Lease {
    token: u64,
    expires_at: Instant,
}

/// In-memory [`LockProvider`] with expiring leases.
///
/// The guard releases the lock on drop, but only if it still owns it:
/// a holder that outlived its lease must not release a lease some
/// other acquirer now holds.
#[derive(Clone, Default)]
pub struct MemoryLockProvider {
    locks: Arc<Mutex<HashMap<String, Lease>>>,
    next_token: Arc<AtomicU64>,
}

impl MemoryLockProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryLockGuard {
    locks: Arc<Mutex<HashMap<String, Lease>>>,
    name: String,
    token: u64,
}

impl Drop for MemoryLockGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        if locks.get(&self.name).is_some_and(|l| l.token == self.token) {
            locks.remove(&self.name);
        }
    }
}

impl LockProvider for MemoryLockProvider {
    type Guard = MemoryLockGuard;

    async fn try_acquire(&self, name: &str, lease: Duration) -> OrgResult<Option<Self::Guard>> {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        let now = Instant::now();

        if locks.get(name).is_some_and(|l| now < l.expires_at) {
            return Ok(None);
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        locks.insert(
            name.to_string(),
            Lease {
                token,
                expires_at: now + lease,
            },
        );

        Ok(Some(MemoryLockGuard {
            locks: Arc::clone(&self.locks),
            name: name.to_string(),
            token,
        }))
    }
}
