//! Bot configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/botelho/config.toml` by default. Every field has a default
//! matching the LHC deployment except the secrets.
//!
//! Secret values (`telegram.token`, `thingspeak.write_key`) support secret
//! references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use botelho_core::{SourceCategory, parse_timezone};
use botelho_providers::{FetchConfig, SourceDescriptor, default_descriptors};
use botelho_server::{DEFAULT_API_BASE, DEFAULT_POLL_TIMEOUT, ServerConfig};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::secret;

// ---------------------------------------------------------------------------
// BotConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// IANA timezone for rendered dates and month boundaries.
    pub timezone: String,

    /// Chat settings.
    pub telegram: TelegramSettings,

    /// Space endpoints.
    pub endpoints: EndpointSettings,

    /// Event sources, in discovery priority order.
    pub calendars: Vec<CalendarSettings>,

    /// Occupancy history settings.
    pub thingspeak: ThingSpeakSettings,

    /// Intervals and timeouts.
    pub schedule: ScheduleSettings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            timezone: botelho_core::DEFAULT_TIMEZONE.name().to_string(),
            telegram: TelegramSettings::default(),
            endpoints: EndpointSettings::default(),
            calendars: default_descriptors()
                .into_iter()
                .map(CalendarSettings::from)
                .collect(),
            thingspeak: ThingSpeakSettings::default(),
            schedule: ScheduleSettings::default(),
        }
    }
}

/// Telegram settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Bot token (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Group that receives status changes and funding notices.
    pub group_id: i64,

    /// Long-poll timeout in seconds.
    pub poll_timeout: u64,

    /// Bot API base URL.
    pub api_base: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token: None,
            group_id: 0,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl TelegramSettings {
    /// Resolves the bot token.
    pub fn resolve_token(&self) -> ClientResult<String> {
        let raw = self.token.as_deref().ok_or_else(|| {
            ClientError::Config(format!(
                "Telegram token not found. Add to {}:\n  \
                 [telegram]\n  \
                 token = \"env::BOTELHO_TELEGRAM_TOKEN\"\n  \
                 group_id = -100123456",
                BotConfig::default_path().display()
            ))
        })?;
        let token = secret::resolve(raw)
            .map_err(|e| ClientError::Config(format!("failed to resolve telegram token: {}", e)))?;
        if token.trim().is_empty() {
            return Err(ClientError::Config("telegram token is empty".into()));
        }
        Ok(token)
    }
}

/// Space endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Open/closed sensor.
    pub status: String,
    /// Who is in the space.
    pub occupancy: String,
    /// Monthly finances.
    pub finance: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            status: botelho_providers::spacenet::DEFAULT_STATUS_URL.to_string(),
            occupancy: botelho_providers::spacenet::DEFAULT_OCCUPANCY_URL.to_string(),
            finance: botelho_providers::finance::DEFAULT_FINANCE_URL.to_string(),
        }
    }
}

/// One event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// Label shown in the "no events" apology.
    pub label: String,
    /// Feed or page URL.
    pub url: String,
    /// Kind of source.
    #[serde(default)]
    pub category: SourceCategory,
}

impl From<SourceDescriptor> for CalendarSettings {
    fn from(descriptor: SourceDescriptor) -> Self {
        Self {
            label: descriptor.label,
            url: descriptor.url,
            category: descriptor.category,
        }
    }
}

impl From<&CalendarSettings> for SourceDescriptor {
    fn from(settings: &CalendarSettings) -> Self {
        SourceDescriptor::new(&settings.label, &settings.url, settings.category)
    }
}

/// ThingSpeak settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThingSpeakSettings {
    /// Channel write key (supports `pass::` and `env::` prefixes). Metrics
    /// are disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_key: Option<String>,

    /// Channel linked by `/historico`.
    pub channel_id: u64,

    /// Update endpoint.
    pub update_url: String,
}

impl Default for ThingSpeakSettings {
    fn default() -> Self {
        Self {
            write_key: None,
            channel_id: 0,
            update_url: botelho_providers::thingspeak::DEFAULT_UPDATE_URL.to_string(),
        }
    }
}

impl ThingSpeakSettings {
    /// Resolves the write key; `None` when metrics are disabled.
    pub fn resolve_write_key(&self) -> ClientResult<Option<String>> {
        match self.write_key.as_deref() {
            None => Ok(None),
            Some(raw) => {
                let key = secret::resolve(raw).map_err(|e| {
                    ClientError::Config(format!("failed to resolve thingspeak write key: {}", e))
                })?;
                Ok(Some(key).filter(|k| !k.trim().is_empty()))
            }
        }
    }
}

/// Intervals and timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub status_interval: u64,
    pub status_retry_backoff: u64,
    pub funding_interval: u64,
    pub metrics_interval: u64,
    pub discovery_timeout: u64,
    pub http_timeout: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            status_interval: server.status_interval.as_secs(),
            status_retry_backoff: server.status_retry_backoff.as_secs(),
            funding_interval: server.funding_interval.as_secs(),
            metrics_interval: server.metrics_interval.as_secs(),
            discovery_timeout: server.discovery_timeout.as_secs(),
            http_timeout: botelho_providers::fetch::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("botelho")
    }

    /// The configured timezone.
    pub fn timezone(&self) -> ClientResult<Tz> {
        parse_timezone(&self.timezone).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Event sources in priority order.
    pub fn sources(&self) -> Vec<SourceDescriptor> {
        self.calendars.iter().map(SourceDescriptor::from).collect()
    }

    /// HTTP client settings for every remote source.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default().with_timeout(Duration::from_secs(self.schedule.http_timeout))
    }

    /// Runtime settings for the bot's tasks.
    pub fn server_config(&self) -> ClientResult<ServerConfig> {
        let schedule = &self.schedule;
        Ok(ServerConfig::new(self.telegram.group_id)
            .with_timezone(self.timezone()?)
            .with_history_channel(self.thingspeak.channel_id)
            .with_status_polling(
                Duration::from_secs(schedule.status_interval),
                Duration::from_secs(schedule.status_retry_backoff),
            )
            .with_funding_interval(Duration::from_secs(schedule.funding_interval))
            .with_metrics_interval(Duration::from_secs(schedule.metrics_interval))
            .with_discovery_timeout(Duration::from_secs(schedule.discovery_timeout)))
    }

    /// Checks everything that does not need the network or secrets.
    pub fn validate(&self) -> ClientResult<()> {
        self.timezone()?;

        let schedule = &self.schedule;
        for (name, value) in [
            ("status_interval", schedule.status_interval),
            ("status_retry_backoff", schedule.status_retry_backoff),
            ("funding_interval", schedule.funding_interval),
            ("metrics_interval", schedule.metrics_interval),
            ("discovery_timeout", schedule.discovery_timeout),
            ("http_timeout", schedule.http_timeout),
        ] {
            if value == 0 {
                return Err(ClientError::Config(format!(
                    "schedule.{} must be greater than zero",
                    name
                )));
            }
        }

        for (name, url) in [
            ("status", &self.endpoints.status),
            ("occupancy", &self.endpoints.occupancy),
            ("finance", &self.endpoints.finance),
        ] {
            if url.trim().is_empty() {
                return Err(ClientError::Config(format!("endpoints.{} is empty", name)));
            }
        }

        for calendar in &self.calendars {
            if calendar.url.trim().is_empty() {
                return Err(ClientError::Config(format!(
                    "calendar `{}` has no url",
                    calendar.label
                )));
            }
        }

        Ok(())
    }
}
