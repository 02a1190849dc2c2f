//! Event types produced by the event sources.
//!
//! - [`CalendarEvent`]: a single occurrence with a UTC start/end
//! - [`EventPhase`]: how an event relates to "now"
//! - [`SourceCategory`]: what kind of source an event came from

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as yielded by an event source.
///
/// `start <= end` always holds; use [`CalendarEvent::new`] to construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Human-readable title.
    pub title: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Optional location text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Creates a new event, or `None` if `end` precedes `start`.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self {
            title: title.into(),
            start,
            end,
            location: None,
        })
    }

    /// Sets the location, ignoring blank values.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        let trimmed = location.trim();
        self.location = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Classifies this event relative to `now`.
    pub fn classify(&self, now: DateTime<Utc>) -> EventPhase {
        if self.end < now {
            EventPhase::Stale
        } else if self.start <= now {
            EventPhase::InProgress
        } else {
            EventPhase::Upcoming
        }
    }

    /// Returns true if the event is happening at `now` (inclusive bounds).
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.classify(now) == EventPhase::InProgress
    }
}

/// Position of an event relative to the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventPhase {
    /// Already over; skipped during discovery.
    Stale,
    /// Happening right now.
    InProgress,
    /// Starts in the future.
    Upcoming,
}

impl EventPhase {
    /// Returns true if an event in this phase ends discovery for a source.
    pub fn is_decision(self) -> bool {
        !matches!(self, Self::Stale)
    }
}

/// The kind of source an event was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    /// The space's own calendar feed.
    #[default]
    Calendar,
    /// An iCalendar export hosted by a third-party platform.
    SocialExport,
    /// A wiki page scraped line by line.
    Wiki,
}

impl SourceCategory {
    /// Returns the kebab-case name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::SocialExport => "social-export",
            Self::Wiki => "wiki",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
