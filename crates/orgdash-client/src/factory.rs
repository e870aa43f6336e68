//! Per-org client construction.

use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::org::Org;
use orgdash_core::ports::BoundaryClientFactory;

use crate::client::MessagingClient;
use crate::config::{ApiVersion, ClientConfig};

/// Builds [`MessagingClient`]s from site-level settings plus each
/// org's own API token.
#[derive(Debug, Clone)]
pub struct EnvClientFactory {
    host: String,
    user_agent: String,
    version: ApiVersion,
}

impl EnvClientFactory {
    pub fn new(host: String, user_agent: String, version: ApiVersion) -> OrgResult<Self> {
        // Validate the shared host once, with a placeholder token; the
        // same check would otherwise only fire per org.
        ClientConfig {
            host: host.clone(),
            api_token: String::new(),
            user_agent: user_agent.clone(),
            version,
        }
        .validate()?;

        Ok(Self {
            host,
            user_agent,
            version,
        })
    }
}

impl BoundaryClientFactory for EnvClientFactory {
    type Client = MessagingClient;

    fn client_for(&self, org: &Org) -> OrgResult<MessagingClient> {
        let api_token = org.api_token.clone().ok_or_else(|| OrgError::Config {
            message: format!("org '{}' has no API token", org.name),
        })?;

        MessagingClient::new(ClientConfig {
            host: self.host.clone(),
            api_token,
            user_agent: self.user_agent.clone(),
            version: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orgdash_core::models::org::OrgConfig;
    use uuid::Uuid;

    fn org(api_token: Option<&str>) -> Org {
        Org {
            id: Uuid::new_v4(),
            name: "Test".into(),
            language: None,
            subdomain: None,
            domain: None,
            timezone: "UTC".into(),
            api_token: api_token.map(Into::into),
            config: OrgConfig::default(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn factory_rejects_host_with_api_path() {
        let result = EnvClientFactory::new(
            "https://app.example.com/api/v2".into(),
            "orgdash/0.1".into(),
            ApiVersion::V2,
        );
        assert!(matches!(result, Err(OrgError::Config { .. })));
    }

    #[test]
    fn org_without_token_is_a_config_error() {
        let factory = EnvClientFactory::new(
            "https://app.example.com".into(),
            "orgdash/0.1".into(),
            ApiVersion::V2,
        )
        .unwrap();

        let result = factory.client_for(&org(None));
        assert!(matches!(result, Err(OrgError::Config { .. })));

        assert!(factory.client_for(&org(Some("token"))).is_ok());
    }
}
