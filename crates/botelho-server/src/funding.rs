//! Hourly funding check.
//!
//! Once per calendar month, the first time income covers expenses, the
//! group gets a thank-you notice.

use std::future::Future;
use std::time::Duration;

use botelho_core::{Finances, FundingMark, FundingTracker};
use botelho_providers::ProviderResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::signals::ShutdownSignal;

/// Watches the space's finances for the month's funding goal.
#[derive(Debug)]
pub struct FundingMonitor {
    interval: Duration,
    timezone: Tz,
    tracker: FundingTracker,
}

impl FundingMonitor {
    /// Creates a monitor checking every `interval`, with months counted in
    /// `timezone`.
    pub fn new(interval: Duration, timezone: Tz) -> Self {
        Self {
            interval,
            timezone,
            tracker: FundingTracker::new(),
        }
    }

    /// Returns true when `finances` observed at `now` warrant a notice.
    pub fn check(&mut self, finances: &Finances, now: DateTime<Utc>) -> bool {
        let month = FundingMark::of(&now.with_timezone(&self.timezone));
        self.tracker.observe(finances, month)
    }

    /// Runs until shutdown, sending the triggering finances on `tx`.
    ///
    /// The first check happens immediately.
    pub async fn run<F, Fut>(mut self, mut fetch: F, tx: mpsc::Sender<Finances>, shutdown: ShutdownSignal)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<Finances>>,
    {
        info!(interval_secs = self.interval.as_secs(), "Funding monitor starting");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = fetch() => result,
            };

            match result {
                Ok(finances) => {
                    debug!(income = finances.income, expenses = finances.expenses, "Checked finances");
                    if self.check(&finances, Utc::now()) {
                        info!("Monthly funding reached");
                        if tx.send(finances).await.is_err() {
                            debug!("Funding receiver closed");
                            break;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Failed to fetch finances"),
            }
        }

        info!("Funding monitor stopped");
    }
}
