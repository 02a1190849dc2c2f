//! Remote sources for botelho.
//!
//! Everything the bot reads over HTTP lives here:
//!
//! - [`Fetcher`] - the shared GET client
//! - [`SpaceNetClient`] - open/closed sensor and occupancy
//! - [`FinanceClient`] - monthly finances
//! - [`EventSource`] - the trait behind every event source, with
//!   [`IcsFeedSource`] and [`WikiSource`] implementations
//! - [`ThingSpeakClient`] - occupancy history push
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ lhc.ics      │ │ MeetUp .ics  │ │ Facebook .ics│ │ Wiki page    │
//! └──────┬───────┘ └──────┬───────┘ └──────┬───────┘ └──────┬───────┘
//!        ▼                ▼                ▼                ▼
//! ┌──────────────────────────────────────────────┐ ┌──────────────┐
//! │               IcsFeedSource                  │ │  WikiSource  │
//! └──────────────────────┬───────────────────────┘ └──────┬───────┘
//!                        │        EventSource             │
//!                        └───────────────┬────────────────┘
//!                                        ▼
//!                                 ┌─────────────┐
//!                                 │ EventStream │ → CalendarEvent
//!                                 └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use botelho_providers::{EventSource, FetchConfig, Fetcher, IcsFeedSource};
//!
//! async fn first_title(source: &dyn EventSource) -> Option<String> {
//!     let mut stream = source.open().await.ok()?;
//!     stream.next().await.map(|event| event.title)
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod finance;
pub mod ics;
pub mod source;
pub mod spacenet;
pub mod thingspeak;
pub mod wiki;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fetch::{FetchConfig, Fetcher};
pub use finance::FinanceClient;
pub use ics::IcsFeedSource;
pub use source::{
    BoxFuture, ErrorSource, EventSource, EventStream, SharedSource, SourceDescriptor,
    default_descriptors,
};
pub use spacenet::SpaceNetClient;
pub use thingspeak::{OccupancySample, ThingSpeakClient};
pub use wiki::WikiSource;
