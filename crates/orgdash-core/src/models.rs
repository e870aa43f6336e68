//! Domain models for orgdash.
//!
//! These are the core types shared across all crates.

pub mod boundary;
pub mod invitation;
pub mod org;
pub mod role;
pub mod task_state;
