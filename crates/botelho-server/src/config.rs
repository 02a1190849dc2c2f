//! Runtime configuration for the bot's background tasks.

use std::time::Duration;

use botelho_core::DEFAULT_TIMEZONE;
use chrono_tz::Tz;

/// Timing and routing for the running bot.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Chat that receives status changes and funding notices.
    pub group_chat_id: i64,

    /// Timezone used for every rendered date and for month boundaries.
    pub timezone: Tz,

    /// ThingSpeak channel linked by `/historico`.
    pub history_channel: u64,

    /// Delay between sensor polls.
    pub status_interval: Duration,

    /// Delay before retrying a failed sensor poll.
    pub status_retry_backoff: Duration,

    /// Delay between finance checks.
    pub funding_interval: Duration,

    /// Delay between occupancy metric pushes.
    pub metrics_interval: Duration,

    /// Budget for each event source during discovery.
    pub discovery_timeout: Duration,

    /// Grace period for background tasks on shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            group_chat_id: 0,
            timezone: DEFAULT_TIMEZONE,
            history_channel: 0,
            status_interval: Duration::from_secs(5 * 60),
            status_retry_backoff: Duration::from_secs(5 * 60),
            funding_interval: Duration::from_secs(60 * 60),
            metrics_interval: Duration::from_secs(10 * 60),
            discovery_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration announcing to `group_chat_id`.
    pub fn new(group_chat_id: i64) -> Self {
        Self {
            group_chat_id,
            ..Default::default()
        }
    }

    /// Builder: set the timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Builder: set the ThingSpeak channel id.
    pub fn with_history_channel(mut self, channel: u64) -> Self {
        self.history_channel = channel;
        self
    }

    /// Builder: set the sensor poll interval and retry backoff.
    pub fn with_status_polling(mut self, interval: Duration, retry_backoff: Duration) -> Self {
        self.status_interval = interval;
        self.status_retry_backoff = retry_backoff;
        self
    }

    /// Builder: set the finance check interval.
    pub fn with_funding_interval(mut self, interval: Duration) -> Self {
        self.funding_interval = interval;
        self
    }

    /// Builder: set the metrics push interval.
    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    /// Builder: set the per-source discovery timeout.
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }
}
