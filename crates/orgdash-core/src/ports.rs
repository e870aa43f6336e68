//! Infrastructure ports: traits for the external collaborators the
//! core depends on (cache service, distributed lock, job queue, email,
//! messaging API).
//!
//! Implementations live in other crates; tests use the in-memory
//! adapters from `orgdash-boundaries`.

use std::collections::BTreeMap;
use std::time::Duration;

use uuid::Uuid;

use crate::error::OrgResult;
use crate::models::boundary::BoundaryRecord;
use crate::models::org::Org;

/// Shared key-value cache with set-with-expiry semantics.
///
/// Values are serialized strings; writers do blind overwrites.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = OrgResult<Option<String>>> + Send;
    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = OrgResult<()>> + Send;
}

/// A named, argument-bearing unit of background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Rebuild the boundary cache for a single org.
    RebuildBoundaries { org_id: Uuid },
    /// Send the invitation email for a pending invitation.
    SendInvitationEmail { invitation_id: Uuid },
}

/// Queue accepting jobs for asynchronous execution. No ordering
/// guarantee between unrelated jobs.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, job: Job) -> impl Future<Output = OrgResult<()>> + Send;
}

/// Time-bounded mutual exclusion keyed by name.
///
/// The lease expires after its duration regardless of whether the
/// holder finished; a holder that outlives its lease loses mutual
/// exclusion.
pub trait LockProvider: Send + Sync {
    /// Guard releasing the lock when dropped.
    type Guard: Send;

    /// Acquire the named lease, or `None` if it is already held.
    fn try_acquire(
        &self,
        name: &str,
        lease: Duration,
    ) -> impl Future<Output = OrgResult<Option<Self::Guard>>> + Send;
}

/// An outbound email: the core supplies recipient, subject, template
/// name, and context; rendering and delivery are external.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: BTreeMap<String, String>,
}

pub trait EmailSender: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = OrgResult<()>> + Send;
}

/// Source of flat boundary records for one org (the external messaging
/// API client).
pub trait BoundarySource: Send + Sync {
    fn get_boundaries(&self) -> impl Future<Output = OrgResult<Vec<BoundaryRecord>>> + Send;
}

/// Builds a per-org [`BoundarySource`] from the org's API credential.
pub trait BoundaryClientFactory: Send + Sync {
    type Client: BoundarySource;

    fn client_for(&self, org: &Org) -> OrgResult<Self::Client>;
}
