//! Space network endpoint: open/closed sensor and occupancy.

use botelho_core::{Occupancy, SpaceStatus};
use tracing::debug;

use crate::error::ProviderResult;
use crate::fetch::Fetcher;

/// Default sensor URL.
pub const DEFAULT_STATUS_URL: &str = "https://lhc.net.br/spacenet.json";

/// Default occupancy URL.
pub const DEFAULT_OCCUPANCY_URL: &str = "https://lhc.net.br/spacenet.json?whois";

/// Client for the space network endpoint.
#[derive(Debug, Clone)]
pub struct SpaceNetClient {
    fetcher: Fetcher,
    status_url: String,
    occupancy_url: String,
}

impl SpaceNetClient {
    /// Creates a client for the given URLs.
    pub fn new(
        fetcher: Fetcher,
        status_url: impl Into<String>,
        occupancy_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            status_url: status_url.into(),
            occupancy_url: occupancy_url.into(),
        }
    }

    /// Reads the open/closed sensor.
    pub async fn status(&self) -> ProviderResult<SpaceStatus> {
        let status: SpaceStatus = self
            .fetcher
            .get_json(&self.status_url)
            .await
            .map_err(|e| e.with_provider("spacenet"))?;
        debug!(open = status.open, last_change = status.last_change, "sensor reading");
        Ok(status)
    }

    /// Reads who is in the space, with duplicate names removed.
    pub async fn occupancy(&self) -> ProviderResult<Occupancy> {
        let occupancy: Occupancy = self
            .fetcher
            .get_json(&self.occupancy_url)
            .await
            .map_err(|e| e.with_provider("spacenet"))?;
        let occupancy = occupancy.deduplicated();
        debug!(
            known = occupancy.known_count(),
            unknown = occupancy.unknown_devices,
            "occupancy"
        );
        Ok(occupancy)
    }
}
