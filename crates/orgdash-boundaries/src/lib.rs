//! Boundary caching and refresh.
//!
//! The cache holds per-org GeoJSON snapshots built from the external
//! messaging API; a periodic sweep rebuilds them under a shared lock.
//! In-memory adapters for the cache, lock, and job queue ports live in
//! [`memory`] and back both tests and single-process deployments.

pub mod cache;
pub mod config;
pub mod keys;
pub mod memory;
pub mod refresh;

pub use cache::BoundaryCache;
pub use config::{BoundaryConfig, FailurePolicy};
pub use refresh::{BoundaryRefresher, SweepSummary};
