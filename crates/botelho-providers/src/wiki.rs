//! Wiki page scraper for recurring events.
//!
//! The events page lists one event per bullet line:
//!
//! ```text
//! * [[Oficina de Computacao Cognitiva]] ''12/09/2017 das 19:00 às 22:30: Oficina com IBM Bluemix''
//! ```
//!
//! Lines that do not match are ignored. Dates and times are wall-clock
//! values in the space's timezone.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, trace};

use botelho_core::time::local_datetime;
use botelho_core::{CalendarEvent, SourceCategory};

use crate::error::ProviderResult;
use crate::fetch::Fetcher;
use crate::source::{BoxFuture, EventSource, EventStream, SourceDescriptor};

static EVENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*\*\s*\[\[([\p{Latin}\s|_0-9/]+)\]\]\s*''(\d{1,2}/\d{1,2}/\d{4})[\p{Latin}\s]+(\d{1,2}:\d{1,2})[\p{Latin}\s]+(\d{1,2}:\d{1,2})[:\s-]*([\p{Latin}\s]+)?''",
    )
    .expect("event line regex is valid")
});

/// Parses one wiki line into an event.
///
/// Returns `None` for lines that do not match the pattern, carry an invalid
/// date or time, or end before they start.
pub fn parse_line(line: &str, timezone: Tz) -> Option<CalendarEvent> {
    let caps = EVENT_LINE.captures(line)?;

    let link = caps[1].trim();
    let mut title = match link.split('|').nth(1) {
        Some(alias) => alias.trim().to_string(),
        None => link.to_string(),
    };
    if let Some(desc) = caps.get(5).map(|m| m.as_str().trim())
        && !desc.is_empty()
        && desc != title
    {
        title = format!("{title} ({desc})");
    }

    let Ok(date) = NaiveDate::parse_from_str(&caps[2], "%d/%m/%Y") else {
        trace!(line, "skipping wiki line with invalid date");
        return None;
    };
    let (Ok(from), Ok(to)) = (
        NaiveTime::parse_from_str(&caps[3], "%H:%M"),
        NaiveTime::parse_from_str(&caps[4], "%H:%M"),
    ) else {
        trace!(line, "skipping wiki line with invalid time");
        return None;
    };

    let start = local_datetime(timezone, date, from)?;
    let end = local_datetime(timezone, date, to)?;
    let event = CalendarEvent::new(title, start, end);
    if event.is_none() {
        trace!(line, "skipping wiki line ending before it starts");
    }
    event
}

/// Extracts every event from a page, in line order.
pub fn extract_events(page: &str, timezone: Tz) -> Vec<CalendarEvent> {
    page.lines()
        .filter_map(|line| parse_line(line, timezone))
        .collect()
}

/// The wiki events page as an event source.
#[derive(Debug, Clone)]
pub struct WikiSource {
    descriptor: SourceDescriptor,
    fetcher: Fetcher,
    timezone: Tz,
}

impl WikiSource {
    /// Creates a wiki source reading the raw page at `descriptor.url`.
    pub fn new(descriptor: SourceDescriptor, fetcher: Fetcher, timezone: Tz) -> Self {
        Self {
            descriptor,
            fetcher,
            timezone,
        }
    }
}

impl EventSource for WikiSource {
    fn label(&self) -> &str {
        &self.descriptor.label
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Wiki
    }

    fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
        Box::pin(async move {
            debug!(source = %self.label(), "reading wiki events page");
            let page = self
                .fetcher
                .get_text(&self.descriptor.url)
                .await
                .map_err(|e| e.with_provider(self.label()))?;
            let events = extract_events(&page, self.timezone);
            debug!(source = %self.label(), count = events.len(), "wiki events extracted");
            Ok(EventStream::from_events(events))
        })
    }
}
