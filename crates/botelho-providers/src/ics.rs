//! iCalendar feed source.
//!
//! Fetches an `.ics` feed over HTTP and yields its VEVENTs in feed order.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use tracing::{debug, trace, warn};

use botelho_core::time::start_of_day;
use botelho_core::{CalendarEvent, SourceCategory};

use crate::error::ProviderResult;
use crate::fetch::Fetcher;
use crate::source::{BoxFuture, EventSource, EventStream, SourceDescriptor};

/// An iCalendar feed at a fixed URL.
#[derive(Debug, Clone)]
pub struct IcsFeedSource {
    descriptor: SourceDescriptor,
    fetcher: Fetcher,
    timezone: Tz,
}

impl IcsFeedSource {
    /// Creates a feed source. Floating times and all-day dates are read in
    /// `timezone`.
    pub fn new(descriptor: SourceDescriptor, fetcher: Fetcher, timezone: Tz) -> Self {
        Self {
            descriptor,
            fetcher,
            timezone,
        }
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.descriptor.url
    }
}

impl EventSource for IcsFeedSource {
    fn label(&self) -> &str {
        &self.descriptor.label
    }

    fn category(&self) -> SourceCategory {
        self.descriptor.category
    }

    fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
        Box::pin(async move {
            debug!(source = %self.label(), url = %self.url(), "reading iCalendar feed");
            let body = self
                .fetcher
                .get_text(self.url())
                .await
                .map_err(|e| e.with_provider(self.label()))?;

            let (tx, stream) = EventStream::channel();
            let timezone = self.timezone;
            let label = self.label().to_string();
            tokio::spawn(async move {
                let events = parse_feed(&body, timezone);
                drop(body);
                trace!(source = %label, count = events.len(), "feed parsed");
                for event in events {
                    if tx.send(event).await.is_err() {
                        trace!(source = %label, "consumer gone, stopping feed");
                        break;
                    }
                }
            });
            Ok(stream)
        })
    }
}

/// Parses feed content into events, in feed order.
///
/// Malformed content yields no events. VEVENTs without a usable start, or
/// whose end precedes their start, are skipped.
pub fn parse_feed(ics: &str, timezone: Tz) -> Vec<CalendarEvent> {
    let calendar = match ics.parse::<Calendar>() {
        Ok(cal) => cal,
        Err(e) => {
            warn!(error = %e, "failed to parse iCalendar content");
            return Vec::new();
        }
    };

    calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => parse_event(event, timezone),
            _ => None,
        })
        .collect()
}

fn parse_event(event: &Event, timezone: Tz) -> Option<CalendarEvent> {
    let title = event.get_summary().unwrap_or_default().trim().to_string();

    let Some(start) = event.get_start().and_then(|dt| to_utc(dt, timezone)) else {
        trace!(summary = %title, "skipping VEVENT without usable DTSTART");
        return None;
    };
    let end = match event.get_end() {
        Some(dt) => to_utc(dt, timezone)?,
        None => start,
    };

    let Some(mut parsed) = CalendarEvent::new(title, start, end) else {
        trace!(summary = ?event.get_summary(), "skipping VEVENT ending before it starts");
        return None;
    };
    if let Some(location) = event.get_location() {
        parsed = parsed.with_location(location);
    }
    Some(parsed)
}

/// Converts an iCalendar date or datetime to a UTC instant.
fn to_utc(value: DatePerhapsTime, timezone: Tz) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::Date(date) => start_of_day(timezone, date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            in_zone(timezone, naive)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zone = tzid.parse::<Tz>().unwrap_or_else(|_| {
                debug!(tzid = %tzid, "unknown TZID, using the configured timezone");
                timezone
            });
            in_zone(zone, date_time)
        }
    }
}

fn in_zone(zone: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
