//! Runtime: polling, discovery, chat transport and dispatch.
//!
//! The running bot is a handful of tokio tasks wired through channels:
//!
//! ```text
//! StatusPoller ──status──┐
//! FundingMonitor ─funds──┼──► Dispatcher ──► ChatTransport
//! TelegramClient ─msgs───┘        │
//!                                 └── EventDiscovery (per /quando)
//! OccupancyRecorder (independent, ThingSpeak)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use botelho_server::{EventDiscovery, SignalHandler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!
//!     let discovery = EventDiscovery::new(Vec::new(), Duration::from_secs(10));
//!     let outcome = discovery.discover(chrono::Utc::now()).await;
//!     println!("{outcome:?}");
//! }
//! ```

mod config;
mod discovery;
mod dispatch;
mod error;
mod funding;
mod metrics;
mod poller;
mod signals;
mod telegram;

pub use config::ServerConfig;
pub use discovery::{DEFAULT_SOURCE_TIMEOUT, DiscoveryOutcome, EventDiscovery};
pub use dispatch::{Dispatcher, Inbound, RemoteLookup, SpaceLookup};
pub use error::{ServerError, ServerResult};
pub use funding::FundingMonitor;
pub use metrics::OccupancyRecorder;
pub use poller::{PollerConfig, StatusPoller, status_channel};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use telegram::{ChatTransport, DEFAULT_API_BASE, DEFAULT_POLL_TIMEOUT, TelegramClient};
