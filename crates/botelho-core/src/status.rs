//! Open/closed sensor readings and change detection.
//!
//! The sensor endpoint is polled repeatedly; [`StatusTracker`] decides which
//! readings are worth announcing. A reading is propagated when nothing has
//! been propagated yet, or when `open` differs from the last propagated
//! reading. Everything else is dropped, including readings that only differ
//! in `last_change`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A decoded reading of the space's open/closed sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceStatus {
    /// Whether the space is open.
    pub open: bool,
    /// When the sensor last flipped, in unix seconds.
    #[serde(rename = "lastchange", default)]
    pub last_change: i64,
}

impl SpaceStatus {
    /// Creates a new reading.
    pub fn new(open: bool, last_change: i64) -> Self {
        Self { open, last_change }
    }

    /// Returns the last change as a UTC instant, if it is representable.
    pub fn last_change_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.last_change, 0).single()
    }
}

/// Tracker state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum TrackerState {
    #[default]
    Unknown,
    Known(SpaceStatus),
}

/// Change detector for sensor readings.
///
/// Owned by exactly one task (the status poller); it is not shared.
#[derive(Debug, Default)]
pub struct StatusTracker {
    state: TrackerState,
}

impl StatusTracker {
    /// Creates a tracker in the unknown state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a reading into the tracker.
    ///
    /// Returns the reading when it must be propagated downstream, `None`
    /// otherwise. A propagated reading becomes the new reference value.
    pub fn observe(&mut self, status: SpaceStatus) -> Option<SpaceStatus> {
        match self.state {
            TrackerState::Known(last) if last.open == status.open => None,
            _ => {
                self.state = TrackerState::Known(status);
                Some(status)
            }
        }
    }

    /// Returns the last propagated reading.
    pub fn last(&self) -> Option<SpaceStatus> {
        match self.state {
            TrackerState::Known(status) => Some(status),
            TrackerState::Unknown => None,
        }
    }

    /// Returns true once a reading has been propagated.
    pub fn is_known(&self) -> bool {
        matches!(self.state, TrackerState::Known(_))
    }
}
