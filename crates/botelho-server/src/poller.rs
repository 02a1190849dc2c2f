//! Space status polling.
//!
//! The poller asks the sensor for the open/closed flag on a fixed interval
//! and forwards only transitions. The hand-off channel holds a single
//! status, so a slow consumer throttles polling instead of letting
//! notifications pile up.

use std::future::Future;
use std::time::Duration;

use botelho_core::{SpaceStatus, StatusTracker};
use botelho_providers::ProviderResult;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::signals::ShutdownSignal;

/// Creates the status hand-off channel.
pub fn status_channel() -> (mpsc::Sender<SpaceStatus>, mpsc::Receiver<SpaceStatus>) {
    mpsc::channel(1)
}

/// Poller timing.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Delay after a successful poll.
    pub interval: Duration,
    /// Delay after a failed poll.
    pub retry_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            retry_backoff: Duration::from_secs(5 * 60),
        }
    }
}

/// Polls the space status and emits changes.
#[derive(Debug)]
pub struct StatusPoller {
    config: PollerConfig,
    tracker: StatusTracker,
}

impl StatusPoller {
    /// Creates a poller that has not seen any status yet.
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            tracker: StatusTracker::new(),
        }
    }

    /// Runs until shutdown or until the receiving side is dropped.
    ///
    /// The first successful poll is always forwarded; after that only
    /// changes of the open flag are. Failed polls leave the last known
    /// status untouched.
    pub async fn run<F, Fut>(
        mut self,
        mut fetch: F,
        tx: mpsc::Sender<SpaceStatus>,
        shutdown: ShutdownSignal,
    ) where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<SpaceStatus>>,
    {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Status poller starting"
        );

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        loop {
            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = fetch() => result,
            };

            let delay = match result {
                Ok(status) => {
                    if let Some(changed) = self.tracker.observe(status) {
                        info!(open = changed.open, "Space status changed");
                        tokio::select! {
                            _ = &mut shutdown => break,
                            sent = tx.send(changed) => {
                                if sent.is_err() {
                                    debug!("Status receiver closed");
                                    break;
                                }
                            }
                        }
                    }
                    self.config.interval
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch space status");
                    self.config.retry_backoff
                }
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Status poller stopped");
    }
}
