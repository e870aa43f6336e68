//! Role assignment model and precedence configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default role names, highest precedence first.
pub const DEFAULT_ROLE_ORDER: &[&str] = &["Administrators", "Editors", "Viewers"];

/// A grant of a named permission level to a user within one org.
///
/// At most one assignment exists per `(org, user, role)` triple; a user
/// may hold several roles in the same org.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

/// The configured role set and its total precedence order.
///
/// Precedence only affects which single role is reported as effective;
/// it does not imply membership inheritance (administrators do not
/// count as editors for membership queries).
#[derive(Debug, Clone)]
pub struct RoleConfig {
    order: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ROLE_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RoleConfig {
    /// Build a role set from an explicit precedence order, highest
    /// first.
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|r| r == name)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// The highest-precedence role among `held`, or `None`.
    pub fn effective<'a>(&'a self, held: &[String]) -> Option<&'a str> {
        self.order
            .iter()
            .find(|name| held.iter().any(|h| h == *name))
            .map(String::as_str)
    }
}
