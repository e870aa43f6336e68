//! Client configuration and host validation.

use orgdash_core::error::{OrgError, OrgResult};

/// Supported versions of the messaging API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V1,
    #[default]
    V2,
}

impl ApiVersion {
    /// Path segment of this version, e.g. `v2`.
    pub fn as_path(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

/// Connection settings for one org's API account.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base host, e.g. `https://app.example.com`. Must not already
    /// carry an API path; the client appends it.
    pub host: String,
    pub api_token: String,
    pub user_agent: String,
    pub version: ApiVersion,
}

impl ClientConfig {
    /// Reject hosts that already embed an API path segment. A host
    /// like `https://app.example.com/api/v1` would produce requests
    /// against `…/api/v1/api/v2/…`, a deployment mistake better caught
    /// at construction.
    pub fn validate(&self) -> OrgResult<()> {
        let trimmed = self.host.trim_end_matches('/');
        for version in ["v1", "v2"] {
            if trimmed.ends_with(&format!("api/{version}")) {
                return Err(OrgError::Config {
                    message: format!(
                        "API host '{}' must not include the API path, use the base host",
                        self.host
                    ),
                });
            }
        }
        Ok(())
    }

    /// Full URL of the boundaries endpoint.
    pub fn boundaries_url(&self) -> String {
        format!(
            "{}/api/{}/boundaries.json",
            self.host.trim_end_matches('/'),
            self.version.as_path()
        )
    }
}
