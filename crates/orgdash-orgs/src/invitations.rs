//! Invitation service — creation and email dispatch orchestration.

use std::collections::BTreeMap;

use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::invitation::{CreateInvitation, Invitation};
use orgdash_core::models::org::SiteConfig;
use orgdash_core::models::role::RoleConfig;
use orgdash_core::ports::{EmailMessage, EmailSender, Job, JobQueue};
use orgdash_core::repository::{InvitationRepository, OrgRepository};
use tracing::{debug, info};
use uuid::Uuid;

const INVITATION_TEMPLATE: &str = "orgs/email/invitation_email";

/// Invitation service.
///
/// Creating an invitation persists it and enqueues the email job;
/// actual delivery happens later on a worker calling
/// [`send_email`](InvitationService::send_email).
pub struct InvitationService<O, I, Q, E>
where
    O: OrgRepository,
    I: InvitationRepository,
    Q: JobQueue,
    E: EmailSender,
{
    org_repo: O,
    invitation_repo: I,
    queue: Q,
    email: E,
    roles: RoleConfig,
    site: SiteConfig,
}

impl<O, I, Q, E> InvitationService<O, I, Q, E>
where
    O: OrgRepository,
    I: InvitationRepository,
    Q: JobQueue,
    E: EmailSender,
{
    pub fn new(
        org_repo: O,
        invitation_repo: I,
        queue: Q,
        email: E,
        roles: RoleConfig,
        site: SiteConfig,
    ) -> Self {
        Self {
            org_repo,
            invitation_repo,
            queue,
            email,
            roles,
            site,
        }
    }

    /// Create an invitation and schedule its email.
    pub async fn invite(&self, input: CreateInvitation) -> OrgResult<Invitation> {
        // 1. The invited role must come from the configured set.
        if !self.roles.contains(&input.role) {
            return Err(OrgError::Config {
                message: format!("unknown role '{}'", input.role),
            });
        }

        // 2. The org must exist; the repository surfaces NotFound.
        let org = self.org_repo.get_by_id(input.org_id).await?;

        // 3. Persist; secret generation and uniqueness live in the
        // repository.
        let invitation = self.invitation_repo.create(input).await?;

        // 4. Delivery is asynchronous.
        self.queue
            .enqueue(Job::SendInvitationEmail {
                invitation_id: invitation.id,
            })
            .await?;

        info!(
            org = %org.name,
            invitation_id = %invitation.id,
            role = %invitation.role,
            "Invitation created"
        );

        Ok(invitation)
    }

    /// Build and hand off the invitation email.
    ///
    /// Invitations with an empty address are silently skipped; the
    /// invitation itself stays redeemable via its secret.
    pub async fn send_email(&self, invitation_id: Uuid) -> OrgResult<()> {
        let invitation = self.invitation_repo.get_by_id(invitation_id).await?;

        if invitation.email.is_empty() {
            debug!(%invitation_id, "Invitation has no email address, skipping send");
            return Ok(());
        }

        let org = self.org_repo.get_by_id(invitation.org_id).await?;
        let host = org.host_link(&self.site, false);

        let mut context = BTreeMap::new();
        context.insert("org".to_string(), org.name.clone());
        context.insert("host".to_string(), host);
        context.insert("secret".to_string(), invitation.secret.clone());

        let message = EmailMessage {
            to: invitation.email.clone(),
            subject: format!("{} Invitation", org.name),
            template: INVITATION_TEMPLATE.to_string(),
            context,
        };

        self.email.send(message).await?;
        info!(%invitation_id, org = %org.name, "Invitation email sent");
        Ok(())
    }

    /// Mark an invitation redeemed or cancelled.
    pub async fn deactivate(&self, invitation_id: Uuid) -> OrgResult<()> {
        self.invitation_repo.deactivate(invitation_id).await
    }

    /// Active invitation matching the secret, for the join flow.
    pub async fn find_by_secret(&self, secret: &str) -> OrgResult<Invitation> {
        let invitation = self.invitation_repo.get_by_secret(secret).await?;
        if !invitation.is_active {
            return Err(OrgError::NotFound {
                entity: "invitation".into(),
                id: invitation.id.to_string(),
            });
        }
        Ok(invitation)
    }

    pub async fn list_for_org(&self, org_id: Uuid) -> OrgResult<Vec<Invitation>> {
        self.invitation_repo.list_by_org(org_id).await
    }
}
