//! Role service — grants, revocations, and effective role resolution.

use orgdash_core::context::RequestContext;
use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::role::RoleConfig;
use orgdash_core::repository::RoleAssignmentRepository;
use tracing::info;
use uuid::Uuid;

/// Role service.
///
/// Wraps the assignment repository with role-name validation and
/// precedence-based resolution. Role names outside the configured set
/// indicate a deployment misconfiguration and are rejected as fatal.
pub struct RoleService<R: RoleAssignmentRepository> {
    repo: R,
    config: RoleConfig,
}

impl<R: RoleAssignmentRepository> RoleService<R> {
    pub fn new(repo: R, config: RoleConfig) -> Self {
        Self { repo, config }
    }

    pub fn role_config(&self) -> &RoleConfig {
        &self.config
    }

    fn ensure_known(&self, role: &str) -> OrgResult<()> {
        if self.config.contains(role) {
            Ok(())
        } else {
            Err(OrgError::Config {
                message: format!("unknown role '{role}'"),
            })
        }
    }

    /// Idempotently grant a role to a user within an org.
    pub async fn grant(&self, org_id: Uuid, user_id: Uuid, role: &str) -> OrgResult<()> {
        self.ensure_known(role)?;
        self.repo.grant(org_id, user_id, role).await?;
        info!(%org_id, %user_id, role, "Role granted");
        Ok(())
    }

    /// Revoke a role; a no-op when the user never held it.
    pub async fn revoke(&self, org_id: Uuid, user_id: Uuid, role: &str) -> OrgResult<()> {
        self.ensure_known(role)?;
        self.repo.revoke(org_id, user_id, role).await?;
        info!(%org_id, %user_id, role, "Role revoked");
        Ok(())
    }

    /// The highest-precedence role the user holds in the org, or
    /// `None` when they hold none.
    pub async fn effective_role(&self, org_id: Uuid, user_id: Uuid) -> OrgResult<Option<String>> {
        let held = self.repo.roles_for_user(org_id, user_id).await?;
        Ok(self.config.effective(&held).map(str::to_string))
    }

    /// Effective role for the user against the context org, consulting
    /// the context's resolution cache first.
    ///
    /// A context without an org resolves to no role. The cache is
    /// cleared by the context itself whenever its org changes, so a
    /// hit is always for the current org.
    pub async fn effective_role_cached(
        &self,
        ctx: &mut RequestContext,
        user_id: Uuid,
    ) -> OrgResult<Option<String>> {
        let Some(org_id) = ctx.org().map(|org| org.id) else {
            return Ok(None);
        };

        if let Some(cached) = ctx.cached_role(user_id) {
            return Ok(cached.map(str::to_string));
        }

        let resolved = self.effective_role(org_id, user_id).await?;
        ctx.cache_role(user_id, resolved.clone());
        Ok(resolved)
    }

    /// Direct members holding the role. Precedence affects resolution
    /// only; administrators are not implicit editors here.
    pub async fn members_with_role(&self, org_id: Uuid, role: &str) -> OrgResult<Vec<Uuid>> {
        self.ensure_known(role)?;
        self.repo.users_with_role(org_id, role).await
    }

    /// Distinct users holding any role in the org.
    pub async fn members(&self, org_id: Uuid) -> OrgResult<Vec<Uuid>> {
        self.repo.users_in_org(org_id).await
    }
}
