//! Org-scoped services: role resolution, invitations, and scheduled
//! task tracking.
//!
//! Services are generic over the repository and port traits from
//! `orgdash-core`, so this crate has no dependency on the database
//! layer.

pub mod invitations;
pub mod roles;
pub mod tasks;

pub use invitations::InvitationService;
pub use roles::RoleService;
pub use tasks::TaskRunner;
