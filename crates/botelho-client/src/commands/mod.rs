//! Subcommand implementations.

pub mod config;
pub mod query;
pub mod run;

use std::sync::Arc;

use botelho_core::SourceCategory;
use botelho_providers::{
    FinanceClient, Fetcher, IcsFeedSource, SharedSource, SourceDescriptor, SpaceNetClient,
    WikiSource,
};
use botelho_server::{EventDiscovery, ServerConfig};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::BotConfig;
use crate::error::ClientResult;

/// Clients for everything the bot reads.
pub(crate) struct Remotes {
    pub fetcher: Fetcher,
    pub spacenet: SpaceNetClient,
    pub finance: FinanceClient,
    pub discovery: EventDiscovery,
}

impl Remotes {
    /// Builds the clients described by `config`.
    pub fn from_config(config: &BotConfig, server: &ServerConfig) -> ClientResult<Self> {
        let fetcher = Fetcher::new(&config.fetch_config())?;
        let spacenet = SpaceNetClient::new(
            fetcher.clone(),
            &config.endpoints.status,
            &config.endpoints.occupancy,
        );
        let finance = FinanceClient::new(fetcher.clone(), &config.endpoints.finance);
        let sources = build_sources(config.sources(), &fetcher, server.timezone);
        let discovery = EventDiscovery::new(sources, server.discovery_timeout);

        Ok(Self {
            fetcher,
            spacenet,
            finance,
            discovery,
        })
    }
}

/// Turns descriptors into event sources, keeping their order.
pub(crate) fn build_sources(
    descriptors: Vec<SourceDescriptor>,
    fetcher: &Fetcher,
    timezone: Tz,
) -> Vec<SharedSource> {
    descriptors
        .into_iter()
        .map(|descriptor| -> SharedSource {
            debug!(
                label = %descriptor.label,
                category = %descriptor.category,
                "Event source registered"
            );
            match descriptor.category {
                SourceCategory::Wiki => {
                    Arc::new(WikiSource::new(descriptor, fetcher.clone(), timezone))
                }
                SourceCategory::Calendar | SourceCategory::SocialExport => {
                    Arc::new(IcsFeedSource::new(descriptor, fetcher.clone(), timezone))
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use botelho_providers::{EventSource, FetchConfig, default_descriptors};

    #[test]
    fn sources_keep_priority_and_kind() {
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let sources = build_sources(default_descriptors(), &fetcher, chrono_tz::UTC);

        let kinds: Vec<(String, SourceCategory)> = sources
            .iter()
            .map(|s| (s.label().to_string(), s.category()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("calendário público".to_string(), SourceCategory::Calendar),
                ("MeetUp".to_string(), SourceCategory::SocialExport),
                ("Facebook".to_string(), SourceCategory::SocialExport),
                ("Wiki do LHC".to_string(), SourceCategory::Wiki),
            ]
        );
    }
}
