//! Org dashboard background service.
//!
//! Connects to SurrealDB, runs migrations, then alternates between
//! periodic boundary sweeps and draining the job queue (single rebuild
//! and invitation email jobs).

use std::error::Error;
use std::time::Duration;

use orgdash_boundaries::memory::{MemoryCacheStore, MemoryJobQueue, MemoryLockProvider};
use orgdash_boundaries::{BoundaryCache, BoundaryConfig, BoundaryRefresher};
use orgdash_client::{ApiVersion, EnvClientFactory};
use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::org::SiteConfig;
use orgdash_core::models::role::RoleConfig;
use orgdash_core::ports::{EmailMessage, EmailSender, Job};
use orgdash_db::repository::{
    SurrealInvitationRepository, SurrealOrgRepository, SurrealTaskStateRepository,
};
use orgdash_db::{DbConfig, DbManager};
use orgdash_orgs::InvitationService;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Hands finished messages to the operator's log; actual delivery is
/// wired up per deployment.
#[derive(Clone)]
struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> OrgResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            template = %message.template,
            "Email ready for delivery"
        );
        Ok(())
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("orgdash=info".parse()?),
        )
        .init();

    info!("Starting orgdash server");

    // Database.
    let db_config = DbConfig::from_env();
    let manager = DbManager::connect(&db_config).await?;
    orgdash_db::run_migrations(manager.client()).await?;
    let db = manager.client().clone();

    // Messaging API client factory.
    let api_host = std::env::var("ORGDASH_API_HOST").map_err(|_| OrgError::Config {
        message: "ORGDASH_API_HOST is not set".into(),
    })?;
    let user_agent = env_or("ORGDASH_API_USER_AGENT", "orgdash/0.1");
    let api_version = match env_or("ORGDASH_API_VERSION", "v2").as_str() {
        "v1" => ApiVersion::V1,
        "v2" => ApiVersion::V2,
        other => {
            return Err(Box::new(OrgError::Config {
                message: format!("unsupported API version '{other}'"),
            }) as Box<dyn Error>);
        }
    };
    let factory = EnvClientFactory::new(api_host, user_agent, api_version)?;

    // Boundary cache + refresher over the in-process adapters.
    let boundary_config = BoundaryConfig::default();
    let queue = MemoryJobQueue::new();
    let cache = BoundaryCache::new(
        MemoryCacheStore::new(),
        queue.clone(),
        boundary_config.clone(),
    );
    let refresher = BoundaryRefresher::new(
        SurrealOrgRepository::new(db.clone()),
        factory,
        SurrealTaskStateRepository::new(db.clone()),
        MemoryLockProvider::new(),
        cache,
        boundary_config,
    );

    // Invitation email delivery.
    let site = SiteConfig {
        hostname: env_or("ORGDASH_HOSTNAME", "localhost"),
        secure: env_or("ORGDASH_SECURE", "false") == "true",
    };
    let invitations = InvitationService::new(
        SurrealOrgRepository::new(db.clone()),
        SurrealInvitationRepository::new(db.clone()),
        queue.clone(),
        LogEmailSender,
        RoleConfig::default(),
        site,
    );

    let sweep_interval: u64 = env_or("ORGDASH_SWEEP_INTERVAL_SECS", "3600").parse()?;
    let mut ticker = tokio::time::interval(Duration::from_secs(sweep_interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match refresher.sweep().await {
                    Ok(summary) if summary.skipped => {}
                    Ok(summary) => {
                        info!(rebuilt = summary.rebuilt, failed = summary.failed, "Sweep finished");
                    }
                    Err(e) => error!(error = %e, "Sweep failed"),
                }

                for job in queue.drain() {
                    match job {
                        Job::RebuildBoundaries { org_id } => {
                            if let Err(e) = refresher.rebuild_org(org_id).await {
                                warn!(%org_id, error = %e, "Boundary rebuild job failed");
                            }
                        }
                        Job::SendInvitationEmail { invitation_id } => {
                            if let Err(e) = invitations.send_email(invitation_id).await {
                                warn!(%invitation_id, error = %e, "Invitation email job failed");
                            }
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
