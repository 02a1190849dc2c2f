//! Telegram Bot API transport.
//!
//! Outgoing messages go through [`ChatTransport`] so the dispatcher can be
//! driven by a fake in tests. Incoming messages are long-polled with
//! `getUpdates` and forwarded on a channel.

use std::time::Duration;

use botelho_protocol::{GetUpdates, Message, SendMessage, Update, decode_response};
use botelho_providers::BoxFuture;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::error::{ServerError, ServerResult};
use crate::signals::ShutdownSignal;

/// Default Bot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default long-poll timeout, in seconds.
pub const DEFAULT_POLL_TIMEOUT: u64 = 60;

/// Delay before polling again after a failed `getUpdates`.
const UPDATE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Something that can deliver a message to a chat.
pub trait ChatTransport: Send + Sync {
    /// Sends `message`.
    fn send(&self, message: SendMessage) -> BoxFuture<'_, ServerResult<()>>;
}

/// Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
    poll_timeout: u64,
}

impl TelegramClient {
    /// Creates a client for `token` against `api_base`.
    pub fn new(api_base: &str, token: &str, poll_timeout: u64) -> ServerResult<Self> {
        if token.trim().is_empty() {
            return Err(ServerError::config("Telegram token is empty"));
        }
        // Long polls hold the request open for `poll_timeout` seconds.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout + 15))
            .user_agent(botelho_providers::fetch::DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| ServerError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    /// Calls a Bot API method with a JSON body.
    async fn call<B, T>(&self, method: &str, body: &B) -> ServerResult<T>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(botelho_protocol::ProtocolError::from)?;
        trace!(method, bytes = payload.len(), "Bot API call");

        let response = self
            .client
            .post(format!("{}/{}", self.base, method))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ServerError::transport(format!("{} failed: {}", method, redact(e))))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServerError::transport(format!("{} failed: {}", method, redact(e))))?;

        Ok(decode_response(&bytes)?)
    }

    /// Sends a message.
    pub async fn send_message(&self, message: &SendMessage) -> ServerResult<Message> {
        self.call("sendMessage", message).await
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> ServerResult<Vec<Update>> {
        self.call("getUpdates", &GetUpdates::messages(offset, self.poll_timeout))
            .await
    }

    /// Forwards incoming messages to `tx` until shutdown or until the
    /// receiver is dropped.
    pub async fn run_updates(self, tx: mpsc::Sender<Message>, shutdown: ShutdownSignal) {
        info!("Listening for chat messages");

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        let mut offset = None;
        loop {
            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = self.get_updates(offset) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let Some(message) = update.message else {
                            continue;
                        };
                        debug!(chat = message.chat.id, "Received message");
                        if tx.send(message).await.is_err() {
                            debug!("Message receiver closed");
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch updates");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(UPDATE_RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Stopped listening for chat messages");
    }
}

impl ChatTransport for TelegramClient {
    fn send(&self, message: SendMessage) -> BoxFuture<'_, ServerResult<()>> {
        Box::pin(async move {
            self.send_message(&message).await?;
            Ok(())
        })
    }
}

/// Strips the request URL, which carries the bot token.
fn redact(e: reqwest::Error) -> reqwest::Error {
    e.without_url()
}

#[cfg(test)]
mod tests {
    use super::*;
    use botelho_protocol::ProtocolError;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:abc";

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::new(&server.uri(), TOKEN, 0).unwrap()
    }

    fn sent_message_body() -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "result": {"message_id": 9, "chat": {"id": -5, "type": "group"}, "date": 0, "text": "oi"}
        })
    }

    #[test]
    fn empty_token_rejected() {
        let err = TelegramClient::new(DEFAULT_API_BASE, "  ", 60).unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));
    }

    #[tokio::test]
    async fn send_message_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_partial_json(serde_json::json!({
                "chat_id": -5,
                "text": "oi",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message_body()))
            .expect(1)
            .mount(&server)
            .await;

        let sent = client(&server)
            .send_message(&SendMessage::new(-5, "oi").markdown())
            .await
            .unwrap();
        assert_eq!(sent.message_id, 9);
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .send(SendMessage::new(1, "x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Protocol(ProtocolError::Api { code: Some(400), .. })
        ));
    }

    #[tokio::test]
    async fn updates_are_forwarded_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .and(body_partial_json(serde_json::json!({"timeout": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 10, "message": {"message_id": 1, "chat": {"id": -5, "type": "group"}, "text": "/status"}},
                    {"update_id": 11},
                    {"update_id": 12, "message": {"message_id": 2, "chat": {"id": -5, "type": "group"}, "text": "/quem"}}
                ]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .and(body_partial_json(serde_json::json!({"offset": 13})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "result": []})),
            )
            .mount(&server)
            .await;

        let handler = crate::signals::SignalHandler::new();
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(client(&server).run_updates(tx, handler.shutdown()));

        assert_eq!(rx.recv().await.unwrap().text(), "/status");
        assert_eq!(rx.recv().await.unwrap().text(), "/quem");

        handler.trigger_shutdown();
        task.await.unwrap();
    }
}
