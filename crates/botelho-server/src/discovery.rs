//! Next-event discovery across the configured sources.
//!
//! Sources are tried one at a time in configuration order. Each attempt runs
//! in its own task under a fixed time budget; the first event that is either
//! in progress or still upcoming wins. A source that fails, times out or
//! only holds past events hands over to the next one.

use std::time::Duration;

use botelho_core::{CalendarEvent, EventPhase};
use botelho_providers::{ProviderResult, SharedSource};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Per-source budget.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a discovery run.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryOutcome {
    /// A source produced an event worth announcing.
    Found {
        event: CalendarEvent,
        phase: EventPhase,
        /// Label of the source that produced it.
        source: String,
    },
    /// Every source was tried without a usable event.
    NoEventsFound {
        /// Labels of the sources tried, in order.
        attempted: Vec<String>,
    },
}

/// Finds the next relevant event.
#[derive(Debug, Clone)]
pub struct EventDiscovery {
    sources: Vec<SharedSource>,
    timeout: Duration,
}

impl EventDiscovery {
    /// Creates a discovery over `sources`, tried in the given order.
    pub fn new(sources: Vec<SharedSource>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    /// Source labels in priority order.
    pub fn labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.label().to_string()).collect()
    }

    /// Runs discovery relative to `now`.
    pub async fn discover(&self, now: DateTime<Utc>) -> DiscoveryOutcome {
        let mut attempted = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let label = source.label().to_string();
            attempted.push(label.clone());

            let mut handle = tokio::spawn(first_decision(source.clone(), now));

            match tokio::time::timeout(self.timeout, &mut handle).await {
                Ok(Ok(Ok(Some((event, phase))))) => {
                    info!(source = %label, title = %event.title, ?phase, "Found event");
                    return DiscoveryOutcome::Found {
                        event,
                        phase,
                        source: label,
                    };
                }
                Ok(Ok(Ok(None))) => {
                    debug!(source = %label, "No current or upcoming event");
                }
                Ok(Ok(Err(e))) => {
                    warn!(source = %label, error = %e, "Event source failed");
                }
                Ok(Err(e)) => {
                    warn!(source = %label, error = %e, "Event source task died");
                }
                Err(_) => {
                    // The attempt keeps no state worth waiting for.
                    handle.abort();
                    warn!(
                        source = %label,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Event source timed out"
                    );
                }
            }
        }

        DiscoveryOutcome::NoEventsFound { attempted }
    }
}

/// Opens `source` and returns its first in-progress or upcoming event.
///
/// Returning early drops the stream, which stops the source's producer.
async fn first_decision(
    source: SharedSource,
    now: DateTime<Utc>,
) -> ProviderResult<Option<(CalendarEvent, EventPhase)>> {
    let mut stream = source.open().await?;
    while let Some(event) = stream.next().await {
        let phase = event.classify(now);
        if phase.is_decision() {
            return Ok(Some((event, phase)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use botelho_core::SourceCategory;
    use botelho_providers::{BoxFuture, ErrorSource, EventSource, EventStream};
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeSource {
        label: String,
        delay: Duration,
        events: Vec<CalendarEvent>,
        opened: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(label: &str, delay: Duration, events: Vec<CalendarEvent>) -> Self {
            Self {
                label: label.to_string(),
                delay,
                events,
                opened: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl EventSource for FakeSource {
        fn label(&self) -> &str {
            &self.label
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::Calendar
        }

        fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
            Box::pin(async move {
                self.opened.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                Ok(EventStream::from_events(self.events.clone()))
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn event(title: &str, start_hour: u32, end_hour: u32) -> CalendarEvent {
        CalendarEvent::new(
            title,
            Utc.with_ymd_and_hms(2024, 3, 15, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, end_hour, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn discovery(sources: Vec<SharedSource>) -> EventDiscovery {
        EventDiscovery::new(sources, DEFAULT_SOURCE_TIMEOUT)
    }

    mod ordering {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn timed_out_source_falls_through() {
            let slow = FakeSource::new(
                "calendário público",
                Duration::from_secs(30),
                vec![event("never seen", 19, 22)],
            );
            let meetup = FakeSource::new("MeetUp", Duration::ZERO, vec![event("Dojo", 19, 22)]);
            let facebook = Arc::new(FakeSource::new(
                "Facebook",
                Duration::ZERO,
                vec![event("Festa", 20, 23)],
            ));
            let facebook_opened = facebook.opened.clone();

            let start = tokio::time::Instant::now();
            let outcome = discovery(vec![Arc::new(slow), Arc::new(meetup), facebook])
                .discover(now())
                .await;

            assert_eq!(
                outcome,
                DiscoveryOutcome::Found {
                    event: event("Dojo", 19, 22),
                    phase: EventPhase::Upcoming,
                    source: "MeetUp".to_string(),
                }
            );
            assert_eq!(start.elapsed(), DEFAULT_SOURCE_TIMEOUT);
            assert_eq!(facebook_opened.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn first_decision_in_stream_wins() {
            let source = FakeSource::new(
                "calendário público",
                Duration::ZERO,
                vec![
                    event("Antigo", 8, 9),
                    event("Oficina", 11, 14),
                    event("Mais tarde", 19, 22),
                ],
            );

            let outcome = discovery(vec![Arc::new(source)]).discover(now()).await;
            match outcome {
                DiscoveryOutcome::Found { event, phase, .. } => {
                    assert_eq!(event.title, "Oficina");
                    assert_eq!(phase, EventPhase::InProgress);
                }
                other => panic!("expected an event, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn failing_source_falls_through() {
            let wiki = FakeSource::new("Wiki do LHC", Duration::ZERO, vec![event("Hackday", 13, 18)]);
            let outcome = discovery(vec![
                Arc::new(ErrorSource::new("calendário público", "connection refused")),
                Arc::new(wiki),
            ])
            .discover(now())
            .await;

            assert!(matches!(
                outcome,
                DiscoveryOutcome::Found { ref source, .. } if source == "Wiki do LHC"
            ));
        }
    }

    mod exhaustion {
        use super::*;

        #[tokio::test]
        async fn only_stale_events() {
            let a = FakeSource::new("calendário público", Duration::ZERO, vec![event("a", 8, 9)]);
            let b = FakeSource::new("MeetUp", Duration::ZERO, vec![]);
            let outcome = discovery(vec![Arc::new(a), Arc::new(b)])
                .discover(now())
                .await;

            assert_eq!(
                outcome,
                DiscoveryOutcome::NoEventsFound {
                    attempted: vec!["calendário público".to_string(), "MeetUp".to_string()],
                }
            );
        }

        #[tokio::test(start_paused = true)]
        async fn every_source_times_out() {
            let sources: Vec<SharedSource> = ["a", "b", "c"]
                .into_iter()
                .map(|label| {
                    Arc::new(FakeSource::new(label, Duration::from_secs(60), vec![]))
                        as SharedSource
                })
                .collect();

            let start = tokio::time::Instant::now();
            let outcome = discovery(sources).discover(now()).await;

            assert_eq!(start.elapsed(), DEFAULT_SOURCE_TIMEOUT * 3);
            assert!(matches!(
                outcome,
                DiscoveryOutcome::NoEventsFound { ref attempted } if attempted.len() == 3
            ));
        }

        struct Released(Arc<AtomicBool>);

        impl Drop for Released {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        struct HangingSource {
            released: Arc<AtomicBool>,
        }

        impl EventSource for HangingSource {
            fn label(&self) -> &str {
                "hang"
            }

            fn category(&self) -> SourceCategory {
                SourceCategory::Calendar
            }

            fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
                let guard = Released(self.released.clone());
                Box::pin(async move {
                    let _guard = guard;
                    std::future::pending::<ProviderResult<EventStream>>().await
                })
            }
        }

        #[tokio::test(start_paused = true)]
        async fn timed_out_attempt_is_released() {
            let released = Arc::new(AtomicBool::new(false));
            let source = HangingSource {
                released: released.clone(),
            };

            let outcome = discovery(vec![Arc::new(source)]).discover(now()).await;
            assert_eq!(
                outcome,
                DiscoveryOutcome::NoEventsFound {
                    attempted: vec!["hang".to_string()],
                }
            );

            // Abort takes effect the next time the runtime polls the task.
            for _ in 0..10 {
                if released.load(Ordering::SeqCst) {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert!(released.load(Ordering::SeqCst));
        }

        #[tokio::test]
        async fn no_sources() {
            let outcome = discovery(Vec::new()).discover(now()).await;
            assert_eq!(outcome, DiscoveryOutcome::NoEventsFound { attempted: vec![] });
        }
    }

    #[test]
    fn labels_in_order() {
        let d = discovery(vec![
            Arc::new(ErrorSource::new("x", "e")),
            Arc::new(ErrorSource::new("y", "e")),
        ]);
        assert_eq!(d.labels(), vec!["x", "y"]);
    }
}
