//! Org domain model.
//!
//! An org is an isolated dashboard tenant: its own subdomain or custom
//! domain, its own API credential for the external messaging service,
//! and its own configuration. Orgs are never hard-deleted, only
//! deactivated.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single typed configuration value.
///
/// Variant order matters for untagged deserialization: booleans and
/// numbers must be tried before strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Number(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

/// Per-org configuration: a map from setting name to a typed value,
/// loaded once at entity construction.
///
/// Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgConfig(BTreeMap<String, ConfigValue>);

impl OrgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(ConfigValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(ConfigValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(ConfigValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Site-wide settings needed to build org-facing links.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Top-level hostname the dashboard is served under
    /// (e.g. `example.com`).
    pub hostname: String,
    /// Whether sessions are served over HTTPS.
    pub secure: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".into(),
            secure: false,
        }
    }
}

/// An isolated organization unit (dashboard tenant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Org {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Main language used by this org.
    pub language: Option<String>,
    /// Unique subdomain under the site hostname.
    pub subdomain: Option<String>,
    /// Unique custom domain, if the org has one.
    pub domain: Option<String>,
    /// IANA timezone name (e.g. `Africa/Kigali`).
    pub timezone: String,
    /// API token for the external messaging service account this
    /// dashboard is tied to.
    pub api_token: Option<String>,
    /// Typed per-org configuration.
    pub config: OrgConfig,
    /// Deactivated orgs are excluded from sweeps and listings.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Org {
    /// Build the public link for this org.
    ///
    /// Custom domains are only used for unauthenticated visitors on a
    /// secure site, and are served plain HTTP (the site certificate
    /// only covers the main hostname).
    pub fn host_link(&self, site: &SiteConfig, user_authenticated: bool) -> String {
        if let Some(domain) = &self.domain
            && site.secure
            && !user_authenticated
        {
            return format!("http://{domain}");
        }

        let prefix = if site.secure { "https://" } else { "http://" };

        match self.subdomain.as_deref() {
            Some(subdomain) if !subdomain.is_empty() => {
                format!("{prefix}{subdomain}.{}", site.hostname)
            }
            _ => format!("{prefix}{}", site.hostname),
        }
    }
}

/// Fields required to create a new org.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrg {
    pub name: String,
    pub language: Option<String>,
    pub subdomain: Option<String>,
    pub domain: Option<String>,
    /// Defaults to `UTC` when absent.
    pub timezone: Option<String>,
    pub api_token: Option<String>,
    pub config: Option<OrgConfig>,
}

/// Fields that can be updated on an existing org.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrg {
    pub name: Option<String>,
    pub language: Option<String>,
    pub subdomain: Option<String>,
    pub domain: Option<String>,
    pub timezone: Option<String>,
    pub api_token: Option<String>,
    pub config: Option<OrgConfig>,
}
