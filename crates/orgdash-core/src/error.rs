//! Error types for the orgdash system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrgError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// User-facing validation failure (e.g. a subdomain that is
    /// already taken).
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Fatal misconfiguration — never retried, surfaced to the caller.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(String),

    /// Failure talking to the external messaging API.
    #[error("External API error: {0}")]
    Api(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrgResult<T> = Result<T, OrgError>;
