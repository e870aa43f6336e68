//! Boundary fetching over the messaging API.

use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::boundary::{BoundaryLevel, BoundaryRecord, Geometry};
use orgdash_core::ports::BoundarySource;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;

/// One page of a cursor-paginated listing.
#[derive(Debug, Deserialize)]
struct Page {
    next: Option<String>,
    results: Vec<WireBoundary>,
}

/// A boundary as the API serializes it.
#[derive(Debug, Deserialize)]
struct WireBoundary {
    boundary: String,
    name: String,
    level: u32,
    parent: Option<String>,
    geometry: Option<Geometry>,
}

impl WireBoundary {
    /// Convert to a domain record; `None` for entries the cache cannot
    /// use (missing geometry, levels outside the two-level hierarchy).
    fn into_record(self) -> Option<BoundaryRecord> {
        let level = match BoundaryLevel::from_code(self.level) {
            Some(level) => level,
            None => {
                debug!(boundary = %self.boundary, level = self.level, "Ignoring boundary at unsupported level");
                return None;
            }
        };

        let Some(geometry) = self.geometry else {
            warn!(boundary = %self.boundary, "Boundary has no geometry, skipping");
            return None;
        };

        Some(BoundaryRecord {
            boundary_id: self.boundary,
            name: self.name,
            level,
            parent_id: self.parent,
            geometry,
        })
    }
}

/// HTTP client for one org's messaging API account.
pub struct MessagingClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MessagingClient {
    pub fn new(config: ClientConfig) -> OrgResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OrgError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    async fn fetch_page(&self, url: &Url) -> OrgResult<Page> {
        let response = self
            .http
            .get(url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.config.api_token),
            )
            .send()
            .await
            .map_err(|e| OrgError::Api(format!("request to {url} failed: {e}")))?
            .error_for_status()
            .map_err(|e| OrgError::Api(format!("request to {url} failed: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| OrgError::Api(format!("invalid response from {url}: {e}")))
    }
}

impl BoundarySource for MessagingClient {
    async fn get_boundaries(&self) -> OrgResult<Vec<BoundaryRecord>> {
        let mut url = Url::parse(&self.config.boundaries_url())
            .map_err(|e| OrgError::Config {
                message: format!("invalid API host '{}': {e}", self.config.host),
            })?;

        let mut records = Vec::new();
        let mut pages = 0;

        loop {
            let page = self.fetch_page(&url).await?;
            pages += 1;

            records.extend(page.results.into_iter().filter_map(WireBoundary::into_record));

            match page.next {
                Some(next) => {
                    url = Url::parse(&next).map_err(|e| {
                        OrgError::Api(format!("invalid pagination cursor '{next}': {e}"))
                    })?;
                }
                None => break,
            }
        }

        debug!(records = records.len(), pages, "Fetched boundaries");
        Ok(records)
    }
}
