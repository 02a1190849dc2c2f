//! Core types: space status, occupancy, events, funding, message formatting

pub mod event;
pub mod format;
pub mod funding;
pub mod occupancy;
pub mod pizza;
pub mod status;
pub mod time;
pub mod tracing;

pub use event::{CalendarEvent, EventPhase, SourceCategory};
pub use funding::{Finances, FundingMark, FundingTracker};
pub use occupancy::{Occupancy, dedup};
pub use status::{SpaceStatus, StatusTracker};
pub use time::{DEFAULT_TIMEZONE, TimeError, parse_timezone};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
