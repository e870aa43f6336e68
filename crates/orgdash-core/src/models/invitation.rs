//! Invitation domain model and secret generation.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the invitation secret.
pub const SECRET_LEN: usize = 64;

/// Alphabet used for invitation secrets. Glyphs that are easy to
/// mistake for one another (`0`/`O`, `1`/`I`) are excluded.
pub const SECRET_ALPHABET: &str = "23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// A pending grant of a role to an email address within an org.
///
/// The secret is the out-of-band redemption token mailed to the
/// invitee; it is unique across all invitations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub org_id: Uuid,
    pub email: String,
    pub secret: String,
    /// Role name granted on redemption.
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new invitation. The secret is generated
/// at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    pub org_id: Uuid,
    pub email: String,
    pub role: String,
}

/// Generate a random invitation secret.
///
/// Uniqueness across existing invitations is the repository's job; on
/// collision it simply generates again.
pub fn generate_secret() -> String {
    let alphabet = SECRET_ALPHABET.as_bytes();
    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}
