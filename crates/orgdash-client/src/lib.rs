//! Client for the external messaging API.
//!
//! Orgs are tied to accounts on an external messaging service; this
//! crate fetches their administrative boundaries over its versioned
//! HTTP API, following cursor pagination.

pub mod client;
pub mod config;
pub mod factory;

pub use client::MessagingClient;
pub use config::{ApiVersion, ClientConfig};
pub use factory::EnvClientFactory;
