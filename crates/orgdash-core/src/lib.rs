//! orgdash Core — domain models, repository traits, and infrastructure
//! ports shared across all crates.
//!
//! Nothing in this crate talks to a database, a cache service, or the
//! network; those concerns live behind the traits in [`repository`] and
//! [`ports`].

pub mod context;
pub mod error;
pub mod models;
pub mod ports;
pub mod repository;

pub use context::RequestContext;
pub use error::{OrgError, OrgResult};
