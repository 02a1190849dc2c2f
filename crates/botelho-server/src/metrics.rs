//! Periodic occupancy history push to ThingSpeak.

use std::future::Future;
use std::time::Duration;

use botelho_core::Occupancy;
use botelho_providers::{OccupancySample, ProviderResult, ThingSpeakClient};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::signals::ShutdownSignal;

/// Records who is at the space on a fixed interval.
#[derive(Debug, Clone)]
pub struct OccupancyRecorder {
    interval: Duration,
    client: ThingSpeakClient,
}

impl OccupancyRecorder {
    /// Creates a recorder pushing through `client` every `interval`.
    pub fn new(interval: Duration, client: ThingSpeakClient) -> Self {
        Self { interval, client }
    }

    /// Pushes one sample for `occupancy`.
    pub async fn record(&self, occupancy: &Occupancy) -> ProviderResult<()> {
        self.client.push(OccupancySample::from(occupancy)).await
    }

    /// Runs until shutdown. Failures are logged and the next tick retries.
    pub async fn run<F, Fut>(self, mut fetch: F, shutdown: ShutdownSignal)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<Occupancy>>,
    {
        info!(interval_secs = self.interval.as_secs(), "Occupancy recorder starting");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let pushed = tokio::select! {
                _ = &mut shutdown => break,
                pushed = async {
                    let occupancy = fetch().await?;
                    self.record(&occupancy).await
                } => pushed,
            };

            if let Err(e) = pushed {
                warn!(error = %e, "Failed to record occupancy");
            }
        }

        info!("Occupancy recorder stopped");
    }
}
