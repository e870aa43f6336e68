//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Org-scoped repositories take an
//! explicit `org_id` parameter to enforce data isolation.

use uuid::Uuid;

use crate::error::OrgResult;
use crate::models::{
    invitation::{CreateInvitation, Invitation},
    org::{ConfigValue, CreateOrg, Org, UpdateOrg},
    task_state::{TaskRun, TaskState},
};

pub trait OrgRepository: Send + Sync {
    fn create(&self, input: CreateOrg) -> impl Future<Output = OrgResult<Org>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OrgResult<Org>> + Send;
    fn get_by_subdomain(&self, subdomain: &str) -> impl Future<Output = OrgResult<Org>> + Send;
    fn get_by_domain(&self, domain: &str) -> impl Future<Output = OrgResult<Org>> + Send;
    fn update(&self, id: Uuid, input: UpdateOrg) -> impl Future<Output = OrgResult<Org>> + Send;
    /// Soft-delete: orgs are deactivated, never removed.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = OrgResult<()>> + Send;
    /// All active orgs in creation order.
    fn list_active(&self) -> impl Future<Output = OrgResult<Vec<Org>>> + Send;
    /// Active orgs in which the user holds at least one role.
    fn list_for_user(&self, user_id: Uuid) -> impl Future<Output = OrgResult<Vec<Org>>> + Send;
    /// Set a single configuration value and return the updated org.
    fn set_config(
        &self,
        id: Uuid,
        name: &str,
        value: ConfigValue,
    ) -> impl Future<Output = OrgResult<Org>> + Send;
}

pub trait RoleAssignmentRepository: Send + Sync {
    /// Idempotently ensure the assignment exists.
    fn grant(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> impl Future<Output = OrgResult<()>> + Send;

    /// Remove the assignment if present; no-op otherwise.
    fn revoke(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> impl Future<Output = OrgResult<()>> + Send;

    /// All role names the user holds in the org.
    fn roles_for_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = OrgResult<Vec<String>>> + Send;

    /// Distinct users holding the role directly (no precedence
    /// inheritance).
    fn users_with_role(
        &self,
        org_id: Uuid,
        role: &str,
    ) -> impl Future<Output = OrgResult<Vec<Uuid>>> + Send;

    /// Distinct users holding any role in the org.
    fn users_in_org(&self, org_id: Uuid) -> impl Future<Output = OrgResult<Vec<Uuid>>> + Send;
}

pub trait InvitationRepository: Send + Sync {
    /// Create an invitation with a freshly generated secret,
    /// regenerating on collision.
    fn create(&self, input: CreateInvitation)
    -> impl Future<Output = OrgResult<Invitation>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OrgResult<Invitation>> + Send;
    fn get_by_secret(&self, secret: &str) -> impl Future<Output = OrgResult<Invitation>> + Send;
    /// Mark an invitation redeemed/cancelled.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = OrgResult<()>> + Send;
    fn list_by_org(&self, org_id: Uuid) -> impl Future<Output = OrgResult<Vec<Invitation>>> + Send;
}

pub trait TaskStateRepository: Send + Sync {
    /// Return the state record for the pair, creating a zero-state
    /// record if none exists. Safe under concurrent creation — backed
    /// by an upsert, not check-then-create.
    fn get_or_create(
        &self,
        org_id: Uuid,
        task_key: &str,
    ) -> impl Future<Output = OrgResult<TaskState>> + Send;

    fn get(
        &self,
        org_id: Uuid,
        task_key: &str,
    ) -> impl Future<Output = OrgResult<TaskState>> + Send;

    /// Record one execution: start/end timestamps, the serialized
    /// result payload, the failing flag, and — only on success — the
    /// last-successful-start timestamp.
    fn record_run(
        &self,
        org_id: Uuid,
        task_key: &str,
        run: TaskRun,
    ) -> impl Future<Output = OrgResult<TaskState>> + Send;

    /// All failing task states for active orgs, for alerting.
    fn list_failing(&self) -> impl Future<Output = OrgResult<Vec<TaskState>>> + Send;

    fn set_disabled(
        &self,
        org_id: Uuid,
        task_key: &str,
        disabled: bool,
    ) -> impl Future<Output = OrgResult<()>> + Send;
}
