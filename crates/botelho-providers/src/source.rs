//! EventSource trait definition.
//!
//! An [`EventSource`] is anything that can produce a sequence of
//! [`CalendarEvent`]s: an iCalendar feed, a scraped wiki page. Opening a
//! source performs the fetch; the returned [`EventStream`] then yields events
//! in source order. Dropping the stream stops the producer.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use botelho_core::{CalendarEvent, SourceCategory};
use tokio::sync::mpsc;

use crate::error::ProviderResult;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capacity of the channel between a producer and its stream.
pub const STREAM_BUFFER: usize = 16;

/// A lazily consumed sequence of events.
///
/// Backed by a bounded channel fed by a producer task; once the stream is
/// dropped the producer's next send fails and it finishes.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<CalendarEvent>,
}

impl EventStream {
    /// Creates a stream and the sender its producer writes to.
    pub fn channel() -> (mpsc::Sender<CalendarEvent>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (tx, Self { rx })
    }

    /// Creates a stream over already-materialized events.
    pub fn from_events(events: Vec<CalendarEvent>) -> Self {
        let (tx, stream) = Self::channel();
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        stream
    }

    /// A stream with no events.
    pub fn empty() -> Self {
        let (_, stream) = Self::channel();
        stream
    }

    /// Returns the next event, or `None` once the source is exhausted.
    pub async fn next(&mut self) -> Option<CalendarEvent> {
        self.rx.recv().await
    }

    /// Drains the stream into a vector.
    pub async fn collect(mut self) -> Vec<CalendarEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

/// A source of calendar events.
///
/// Implementations must be cheap to share across tasks: discovery spawns one
/// task per attempt and moves an `Arc` of the source into it.
pub trait EventSource: Send + Sync {
    /// Human-readable label, used in logs and the "no events" apology.
    fn label(&self) -> &str;

    /// What kind of source this is.
    fn category(&self) -> SourceCategory;

    /// Fetches the source and returns a stream over its events.
    ///
    /// A source whose content is malformed yields an empty stream; only
    /// failures to obtain the content are errors.
    fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>>;
}

impl fmt::Debug for dyn EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("label", &self.label())
            .field("category", &self.category())
            .finish()
    }
}

/// A shared, type-erased event source.
pub type SharedSource = Arc<dyn EventSource>;

/// Where a source reads from and how it is labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Label shown to people.
    pub label: String,
    /// Feed or page URL.
    pub url: String,
    /// Kind of source.
    pub category: SourceCategory,
}

impl SourceDescriptor {
    /// Creates a descriptor.
    pub fn new(label: impl Into<String>, url: impl Into<String>, category: SourceCategory) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            category,
        }
    }
}

/// Default feed order: the space's calendar, two third-party exports, then
/// the wiki page.
pub fn default_descriptors() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "calendário público",
            "https://lhc.net.br/lhc.ics",
            SourceCategory::Calendar,
        ),
        SourceDescriptor::new(
            "MeetUp",
            "https://www.meetup.com/LabHackerCampinas/events/ical/",
            SourceCategory::SocialExport,
        ),
        SourceDescriptor::new(
            "Facebook",
            "https://www.facebook.com/ical/u.php?uid=100009917924593&key=AQBjZm11n-K_NCbW",
            SourceCategory::SocialExport,
        ),
        SourceDescriptor::new(
            "Wiki do LHC",
            "https://lhc.net.br/w/index.php?title=Pr%C3%B3ximos_Eventos&action=raw",
            SourceCategory::Wiki,
        ),
    ]
}

/// A source that always fails, useful for tests and disabled entries.
#[derive(Debug, Clone)]
pub struct ErrorSource {
    label: String,
    message: String,
}

impl ErrorSource {
    /// Creates a source whose `open` fails with a transport error.
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

impl EventSource for ErrorSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Calendar
    }

    fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
        let err = crate::error::ProviderError::transport(self.message.clone())
            .with_provider(self.label.clone());
        Box::pin(async move { Err(err) })
    }
}
