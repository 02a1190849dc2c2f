//! The dispatch loop.
//!
//! One task owns the chat-facing state (the last status text) and reacts to
//! three inputs: status changes from the poller, funding notices from the
//! monitor and messages from the chat. Anything that needs a network
//! round-trip runs in its own task so the loop never waits on a remote.

use std::sync::Arc;

use botelho_core::format::{
    DUCK, FINANCE_ERROR, FUNDING_NOTICE, GHOST, SPACE_EMOJIS, UNKNOWN_STATUS, discovery_failure,
    event_message, finance_message, history_message, occupancy_error, occupancy_message,
    opened_by_message, status_message,
};
use botelho_core::{Finances, Occupancy, SpaceStatus, pizza};
use botelho_protocol::{Command, Message, ReplyMarkup, SendMessage};
use botelho_providers::{BoxFuture, FinanceClient, ProviderResult, SpaceNetClient};
use chrono::Utc;
use chrono_tz::Tz;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ServerConfig;
use crate::discovery::{DiscoveryOutcome, EventDiscovery};
use crate::signals::ShutdownSignal;
use crate::telegram::ChatTransport;

/// Lookups the chat commands need.
pub trait SpaceLookup: Send + Sync {
    /// Who is in the space right now.
    fn occupancy(&self) -> BoxFuture<'_, ProviderResult<Occupancy>>;

    /// This month's finances.
    fn finances(&self) -> BoxFuture<'_, ProviderResult<Finances>>;
}

/// [`SpaceLookup`] backed by the space's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct RemoteLookup {
    spacenet: SpaceNetClient,
    finance: FinanceClient,
}

impl RemoteLookup {
    /// Creates a lookup over the given clients.
    pub fn new(spacenet: SpaceNetClient, finance: FinanceClient) -> Self {
        Self { spacenet, finance }
    }
}

impl SpaceLookup for RemoteLookup {
    fn occupancy(&self) -> BoxFuture<'_, ProviderResult<Occupancy>> {
        Box::pin(self.spacenet.occupancy())
    }

    fn finances(&self) -> BoxFuture<'_, ProviderResult<Finances>> {
        Box::pin(self.finance.finances())
    }
}

/// Receiving ends of the dispatcher's input channels.
#[derive(Debug)]
pub struct Inbound {
    pub status: mpsc::Receiver<SpaceStatus>,
    pub funding: mpsc::Receiver<Finances>,
    pub messages: mpsc::Receiver<Message>,
}

/// Routes events and commands to chat replies.
pub struct Dispatcher {
    transport: Arc<dyn ChatTransport>,
    lookup: Arc<dyn SpaceLookup>,
    discovery: Arc<EventDiscovery>,
    group_chat_id: i64,
    timezone: Tz,
    history_channel: u64,
    last_status: String,
    announcing: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(
        config: &ServerConfig,
        transport: Arc<dyn ChatTransport>,
        lookup: Arc<dyn SpaceLookup>,
        discovery: EventDiscovery,
    ) -> Self {
        Self {
            transport,
            lookup,
            discovery: Arc::new(discovery),
            group_chat_id: config.group_chat_id,
            timezone: config.timezone,
            history_channel: config.history_channel,
            last_status: UNKNOWN_STATUS.to_string(),
            announcing: None,
        }
    }

    /// Runs until shutdown or until every input is closed.
    pub async fn run(mut self, mut inbound: Inbound, shutdown: ShutdownSignal) {
        info!(group = self.group_chat_id, "Dispatcher starting");

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(status) = inbound.status.recv() => self.on_status(status),
                Some(finances) = inbound.funding.recv() => self.on_funding(finances),
                Some(message) = inbound.messages.recv() => self.on_message(message),
                else => break,
            }
        }

        info!("Dispatcher stopped");
    }

    fn on_status(&mut self, status: SpaceStatus) {
        self.last_status = status_message(&status, self.timezone);

        let fallback = self.last_status.clone();
        let previous = self.announcing.take();
        let transport = self.transport.clone();
        let lookup = self.lookup.clone();
        let chat_id = self.group_chat_id;
        let timezone = self.timezone;

        // Lookups may overlap; announcements go out in order.
        self.announcing = Some(tokio::spawn(async move {
            let text = if status.open {
                match lookup.occupancy().await {
                    Ok(occupancy) if occupancy.has_known() => {
                        opened_by_message(&occupancy.who, &status, timezone)
                    }
                    Ok(_) => fallback,
                    Err(e) => {
                        warn!(error = %e, "Failed to fetch occupancy for announcement");
                        fallback
                    }
                }
            } else {
                fallback
            };

            if let Some(previous) = previous
                && let Err(e) = previous.await
            {
                warn!(error = %e, "Previous announcement task died");
            }
            deliver(transport.as_ref(), SendMessage::new(chat_id, text)).await;
        }));
    }

    fn on_funding(&self, finances: Finances) {
        debug!(income = finances.income, expenses = finances.expenses, "Announcing funding");
        self.reply(SendMessage::new(self.group_chat_id, FUNDING_NOTICE));
    }

    fn on_message(&self, message: Message) {
        let Some(command) = Command::parse(&message) else {
            trace!(chat = message.chat.id, "Ignoring message");
            return;
        };
        let chat_id = message.chat.id;
        debug!(command = command.as_str(), chat = chat_id, "Handling command");

        match command {
            Command::Status => self.reply(SendMessage::new(chat_id, self.last_status.clone())),
            Command::History => {
                self.reply(SendMessage::new(chat_id, history_message(self.history_channel)))
            }
            Command::Duck => self.reply(SendMessage::new(chat_id, DUCK)),
            Command::Boo => self.reply(SendMessage::new(chat_id, GHOST)),
            Command::Pizza => {
                let keyboard = ReplyMarkup::keyboard(pizza::KEYBOARD)
                    .resized()
                    .one_time()
                    .forcing_reply();
                self.reply(SendMessage::new(chat_id, pizza::PROMPT).with_markup(keyboard));
            }
            Command::PizzaAnswer(text) => self.reply(
                SendMessage::new(chat_id, pizza::reply(&text))
                    .markdown()
                    .with_markup(ReplyMarkup::remove()),
            ),
            Command::Finances => self.spawn_finances(chat_id),
            Command::Who => self.spawn_who(chat_id),
            Command::When => self.spawn_when(chat_id),
        }
    }

    fn reply(&self, message: SendMessage) {
        let transport = self.transport.clone();
        tokio::spawn(async move { deliver(transport.as_ref(), message).await });
    }

    fn spawn_finances(&self, chat_id: i64) {
        let transport = self.transport.clone();
        let lookup = self.lookup.clone();
        tokio::spawn(async move {
            let text = match lookup.finances().await {
                Ok(finances) => finance_message(&finances),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch finances");
                    FINANCE_ERROR.to_string()
                }
            };
            deliver(transport.as_ref(), SendMessage::new(chat_id, text)).await;
        });
    }

    fn spawn_who(&self, chat_id: i64) {
        let (emoji, cat) = {
            let mut rng = rand::rng();
            (
                SPACE_EMOJIS[rng.random_range(0..SPACE_EMOJIS.len())],
                rng.random_range(0..100) > 50,
            )
        };
        let transport = self.transport.clone();
        let lookup = self.lookup.clone();
        tokio::spawn(async move {
            let text = match lookup.occupancy().await {
                Ok(occupancy) => occupancy_message(&occupancy, emoji, cat),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch occupancy");
                    occupancy_error(emoji)
                }
            };
            deliver(transport.as_ref(), SendMessage::new(chat_id, text)).await;
        });
    }

    fn spawn_when(&self, chat_id: i64) {
        let transport = self.transport.clone();
        let discovery = self.discovery.clone();
        let timezone = self.timezone;
        tokio::spawn(async move {
            let now = Utc::now();
            let message = match discovery.discover(now).await {
                DiscoveryOutcome::Found { event, phase, .. } => {
                    SendMessage::new(chat_id, event_message(&event, phase, now, timezone))
                        .markdown()
                }
                DiscoveryOutcome::NoEventsFound { attempted } => {
                    SendMessage::new(chat_id, discovery_failure(&attempted))
                }
            };
            deliver(transport.as_ref(), message).await;
        });
    }
}

async fn deliver(transport: &dyn ChatTransport, message: SendMessage) {
    let chat_id = message.chat_id;
    if let Err(e) = transport.send(message).await {
        warn!(chat = chat_id, error = %e, "Failed to send message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerResult;
    use crate::signals::SignalHandler;
    use botelho_core::{CalendarEvent, SourceCategory};
    use botelho_providers::{ErrorSource, EventSource, EventStream, ProviderError, SharedSource};
    use std::time::Duration;

    const GROUP: i64 = -100;
    const CHAT: i64 = 55;

    struct FakeTransport {
        tx: mpsc::UnboundedSender<SendMessage>,
    }

    impl ChatTransport for FakeTransport {
        fn send(&self, message: SendMessage) -> BoxFuture<'_, ServerResult<()>> {
            let _ = self.tx.send(message);
            Box::pin(async { Ok(()) })
        }
    }

    #[derive(Default)]
    struct FakeLookup {
        occupancy: Option<Occupancy>,
        occupancy_delay: Duration,
        occupancy_panics: bool,
        finances: Option<Finances>,
    }

    impl SpaceLookup for FakeLookup {
        fn occupancy(&self) -> BoxFuture<'_, ProviderResult<Occupancy>> {
            Box::pin(async move {
                tokio::time::sleep(self.occupancy_delay).await;
                assert!(!self.occupancy_panics, "occupancy lookup blew up");
                self.occupancy
                    .clone()
                    .ok_or_else(|| ProviderError::transport("occupancy down"))
            })
        }

        fn finances(&self) -> BoxFuture<'_, ProviderResult<Finances>> {
            Box::pin(async move {
                self.finances
                    .ok_or_else(|| ProviderError::transport("finances down"))
            })
        }
    }

    struct OngoingSource;

    impl EventSource for OngoingSource {
        fn label(&self) -> &str {
            "calendário público"
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::Calendar
        }

        fn open(&self) -> BoxFuture<'_, ProviderResult<EventStream>> {
            let now = Utc::now();
            let event = CalendarEvent::new(
                "Oficina de solda",
                now - chrono::Duration::hours(1),
                now + chrono::Duration::hours(1),
            )
            .unwrap();
            Box::pin(async move { Ok(EventStream::from_events(vec![event])) })
        }
    }

    struct Harness {
        status: mpsc::Sender<SpaceStatus>,
        funding: mpsc::Sender<Finances>,
        messages: mpsc::Sender<Message>,
        sent: mpsc::UnboundedReceiver<SendMessage>,
        handler: SignalHandler,
        task: JoinHandle<()>,
    }

    impl Harness {
        fn start(lookup: FakeLookup, sources: Vec<SharedSource>) -> Self {
            let (out_tx, sent) = mpsc::unbounded_channel();
            let config = ServerConfig::new(GROUP)
                .with_timezone(chrono_tz::UTC)
                .with_history_channel(123);
            let dispatcher = Dispatcher::new(
                &config,
                Arc::new(FakeTransport { tx: out_tx }),
                Arc::new(lookup),
                EventDiscovery::new(sources, Duration::from_secs(10)),
            );

            let (status, status_rx) = mpsc::channel(1);
            let (funding, funding_rx) = mpsc::channel(1);
            let (messages, messages_rx) = mpsc::channel(8);
            let handler = SignalHandler::new();
            let inbound = Inbound {
                status: status_rx,
                funding: funding_rx,
                messages: messages_rx,
            };
            let task = tokio::spawn(dispatcher.run(inbound, handler.shutdown()));

            Self {
                status,
                funding,
                messages,
                sent,
                handler,
                task,
            }
        }

        async fn say(&self, text: &str) {
            self.messages.send(message(text, None)).await.unwrap();
        }

        async fn next(&mut self) -> SendMessage {
            tokio::time::timeout(Duration::from_secs(60), self.sent.recv())
                .await
                .expect("no message sent")
                .unwrap()
        }

        async fn stop(self) {
            self.handler.trigger_shutdown();
            self.task.await.unwrap();
        }
    }

    fn message(text: &str, reply_to: Option<&str>) -> Message {
        let mut value = serde_json::json!({
            "message_id": 1,
            "chat": {"id": CHAT, "type": "group"},
            "text": text,
        });
        if let Some(original) = reply_to {
            value["reply_to_message"] = serde_json::json!({
                "message_id": 0,
                "chat": {"id": CHAT, "type": "group"},
                "text": original,
            });
        }
        serde_json::from_value(value).unwrap()
    }

    mod status {
        use super::*;

        #[tokio::test]
        async fn unknown_before_first_poll() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);
            h.say("/status").await;
            let sent = h.next().await;
            assert_eq!(sent.chat_id, CHAT);
            assert_eq!(sent.text, UNKNOWN_STATUS);
            h.stop().await;
        }

        #[tokio::test]
        async fn change_is_announced_and_remembered() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);
            h.status.send(SpaceStatus::new(false, 0)).await.unwrap();

            let announced = h.next().await;
            assert_eq!(announced.chat_id, GROUP);
            assert_eq!(
                announced.text,
                "O LHC está fechado🔒 desde Thu Jan  1 00:00:00 1970."
            );

            h.say("/status@botelho_bot").await;
            let reply = h.next().await;
            assert_eq!(reply.chat_id, CHAT);
            assert_eq!(reply.text, announced.text);
            h.stop().await;
        }

        #[tokio::test]
        async fn opening_names_known_people() {
            let lookup = FakeLookup {
                occupancy: Some(Occupancy::new(vec!["ana".into(), "bia".into()], 2)),
                ..Default::default()
            };
            let mut h = Harness::start(lookup, vec![]);
            h.status.send(SpaceStatus::new(true, 0)).await.unwrap();

            let announced = h.next().await;
            assert_eq!(
                announced.text,
                "O LHC foi aberto🔓 por ana, bia às Thu Jan  1 00:00:00 1970."
            );
            h.stop().await;
        }

        #[tokio::test]
        async fn opening_without_occupancy_uses_status_text() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);
            h.status.send(SpaceStatus::new(true, 0)).await.unwrap();

            let announced = h.next().await;
            assert!(announced.text.starts_with("O LHC está aberto🔓 desde"));
            h.stop().await;
        }

        #[tokio::test(start_paused = true)]
        async fn announcements_keep_order() {
            let lookup = FakeLookup {
                occupancy: Some(Occupancy::new(vec!["ana".into()], 0)),
                occupancy_delay: Duration::from_secs(20),
                ..Default::default()
            };
            let mut h = Harness::start(lookup, vec![]);
            h.status.send(SpaceStatus::new(true, 0)).await.unwrap();
            h.status.send(SpaceStatus::new(false, 60)).await.unwrap();

            assert!(h.next().await.text.starts_with("O LHC foi aberto🔓 por ana"));
            assert!(h.next().await.text.starts_with("O LHC está fechado🔒"));
            h.stop().await;
        }

        #[tokio::test]
        async fn announcement_survives_crashed_predecessor() {
            let lookup = FakeLookup {
                occupancy_panics: true,
                ..Default::default()
            };
            let mut h = Harness::start(lookup, vec![]);
            h.status.send(SpaceStatus::new(true, 0)).await.unwrap();
            h.status.send(SpaceStatus::new(false, 60)).await.unwrap();

            assert_eq!(
                h.next().await.text,
                "O LHC está fechado🔒 desde Thu Jan  1 00:01:00 1970."
            );
            h.stop().await;
        }
    }

    mod commands {
        use super::*;

        #[tokio::test]
        async fn quick_replies() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);

            h.say("bom dia").await;
            h.say("/boo").await;
            assert_eq!(h.next().await.text, GHOST);

            h.say("/quém").await;
            assert_eq!(h.next().await.text, DUCK);

            h.say("/historico").await;
            assert_eq!(
                h.next().await.text,
                "Para ver o histórico, acesse: https://thingspeak.com/channels/123"
            );
            h.stop().await;
        }

        #[tokio::test]
        async fn who_lists_people() {
            let lookup = FakeLookup {
                occupancy: Some(Occupancy::new(vec!["ana".into()], 0)),
                ..Default::default()
            };
            let mut h = Harness::start(lookup, vec![]);
            h.say("/quem").await;

            let reply = h.next().await;
            assert!(reply.text.starts_with("Pessoas conhecidas no espaço"));
            assert!(reply.text.ends_with(": ana"));
            h.stop().await;
        }

        #[tokio::test]
        async fn who_failure() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);
            h.say("/quem").await;
            assert!(
                h.next()
                    .await
                    .text
                    .starts_with("Não consegui pegar a lista de membros no espaço")
            );
            h.stop().await;
        }

        #[tokio::test]
        async fn finances() {
            let lookup = FakeLookup {
                finances: Some(Finances::new(1500.0, 1000.0)),
                ..Default::default()
            };
            let mut h = Harness::start(lookup, vec![]);
            h.say("/grana").await;
            assert!(h.next().await.text.starts_with("Temos fluxo positivo"));
            h.stop().await;
        }

        #[tokio::test]
        async fn finances_failure() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);
            h.say("/grana").await;
            assert_eq!(h.next().await.text, FINANCE_ERROR);
            h.stop().await;
        }

        #[tokio::test]
        async fn pizza_flow() {
            let mut h = Harness::start(FakeLookup::default(), vec![]);

            h.say("/pizza").await;
            let prompt = h.next().await;
            assert_eq!(prompt.text, pizza::PROMPT);
            let markup = prompt.reply_markup.unwrap();
            assert!(markup.resize_keyboard && markup.one_time_keyboard && markup.force_reply);
            assert_eq!(markup.keyboard.unwrap().len(), 4);

            h.messages
                .send(message("10", Some(pizza::PROMPT)))
                .await
                .unwrap();
            let answer = h.next().await;
            assert_eq!(answer.text, pizza::reply("10"));
            assert_eq!(answer.parse_mode, Some(botelho_protocol::ParseMode::Markdown));
            assert!(answer.reply_markup.unwrap().remove_keyboard);
            h.stop().await;
        }

        #[tokio::test]
        async fn when_reports_ongoing_event() {
            let mut h = Harness::start(FakeLookup::default(), vec![Arc::new(OngoingSource)]);
            h.say("/quando").await;
            assert_eq!(h.next().await.text, "Tá rolando agora: Oficina de solda");
            h.stop().await;
        }

        #[tokio::test]
        async fn when_apologises() {
            let sources: Vec<SharedSource> = vec![
                Arc::new(ErrorSource::new("calendário público", "down")),
                Arc::new(ErrorSource::new("Wiki do LHC", "down")),
            ];
            let mut h = Harness::start(FakeLookup::default(), sources);
            h.say("/quando").await;
            assert_eq!(
                h.next().await.text,
                discovery_failure(&["calendário público", "Wiki do LHC"])
            );
            h.stop().await;
        }
    }

    #[tokio::test]
    async fn funding_notice_goes_to_group() {
        let mut h = Harness::start(FakeLookup::default(), vec![]);
        h.funding.send(Finances::new(2.0, 1.0)).await.unwrap();
        let sent = h.next().await;
        assert_eq!(sent.chat_id, GROUP);
        assert_eq!(sent.text, FUNDING_NOTICE);
        h.stop().await;
    }
}
