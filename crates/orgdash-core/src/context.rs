//! Request-scoped org context.
//!
//! Handlers carry a [`RequestContext`] explicitly — the current org and
//! a small cache of the resolved effective role — rather than attaching
//! that state to a shared user type.

use uuid::Uuid;

use crate::models::org::Org;

/// Per-request state: the org the request is scoped to, plus the
/// effective role resolved for one user against that org.
///
/// The role cache is keyed by user id and cleared whenever the context
/// org changes, so a stale resolution can never leak across orgs.
#[derive(Debug, Default)]
pub struct RequestContext {
    org: Option<Org>,
    resolved_role: Option<(Uuid, Option<String>)>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_org(org: Org) -> Self {
        Self {
            org: Some(org),
            resolved_role: None,
        }
    }

    pub fn org(&self) -> Option<&Org> {
        self.org.as_ref()
    }

    /// Switch the context to a different org (or none), dropping any
    /// cached role resolution.
    pub fn set_org(&mut self, org: Option<Org>) {
        self.org = org;
        self.resolved_role = None;
    }

    /// Cached effective role for the user, if one was resolved in this
    /// context. `Some(None)` means "resolved: no role".
    pub fn cached_role(&self, user_id: Uuid) -> Option<Option<&str>> {
        match &self.resolved_role {
            Some((cached_user, role)) if *cached_user == user_id => Some(role.as_deref()),
            _ => None,
        }
    }

    pub fn cache_role(&mut self, user_id: Uuid, role: Option<String>) {
        self.resolved_role = Some((user_id, role));
    }
}
