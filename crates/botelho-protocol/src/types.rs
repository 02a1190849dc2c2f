//! Bot API wire types.
//!
//! Only the fields the bot reads or writes are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{ProtocolError, ProtocolResult};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Payload on success.
    pub result: Option<T>,
    /// Error text on failure.
    #[serde(default)]
    pub description: Option<String>,
    /// Error code on failure.
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    /// Converts the envelope into its payload or an error.
    pub fn into_result(self) -> ProtocolResult<T> {
        if !self.ok {
            return Err(ProtocolError::api(
                self.error_code,
                self.description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }
        self.result.ok_or(ProtocolError::MissingResult)
    }
}

/// Decodes a raw response body into its payload.
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> ProtocolResult<T> {
    let response: ApiResponse<T> = serde_json::from_slice(body)?;
    response.into_result()
}

/// An incoming update from `getUpdates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    pub update_id: i64,
    /// New message, if this update carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier, unique within the chat.
    pub message_id: i64,
    /// Sender, absent for channel posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// Conversation the message belongs to.
    pub chat: Chat,
    /// Unix time the message was sent.
    #[serde(default)]
    pub date: i64,
    /// Text, absent for stickers, photos and the like.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// Returns the text, or an empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns the text of the replied-to message, if any.
    pub fn reply_to_text(&self) -> Option<&str> {
        self.reply_to_message
            .as_deref()
            .and_then(|m| m.text.as_deref())
    }
}

/// A chat (private, group, supergroup or channel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier; negative for groups.
    pub id: i64,
    /// Chat type as reported by the API.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Title for groups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A user or bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Username without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// Legacy Markdown.
    Markdown,
    /// HTML subset.
    #[serde(rename = "HTML")]
    Html,
}

/// A single keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    /// Text sent when the button is pressed.
    pub text: String,
}

/// Reply markup attached to an outgoing message.
///
/// The API distinguishes several markup objects; this struct carries the
/// union of the fields the bot uses and omits unset ones on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMarkup {
    /// Custom keyboard rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Vec<Vec<KeyboardButton>>>,
    /// Shrink the keyboard to fit its buttons.
    #[serde(default, skip_serializing_if = "is_false")]
    pub resize_keyboard: bool,
    /// Hide the keyboard after one use.
    #[serde(default, skip_serializing_if = "is_false")]
    pub one_time_keyboard: bool,
    /// Ask clients to show a reply interface.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_reply: bool,
    /// Remove a previously shown custom keyboard.
    #[serde(default, skip_serializing_if = "is_false")]
    pub remove_keyboard: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ReplyMarkup {
    /// A custom keyboard built from rows of labels.
    pub fn keyboard<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keyboard = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|text| KeyboardButton { text: text.into() })
                    .collect()
            })
            .collect();
        Self {
            keyboard: Some(keyboard),
            ..Self::default()
        }
    }

    /// Markup that hides the custom keyboard.
    pub fn remove() -> Self {
        Self {
            remove_keyboard: true,
            ..Self::default()
        }
    }

    /// Shrinks the keyboard to fit.
    #[must_use]
    pub fn resized(mut self) -> Self {
        self.resize_keyboard = true;
        self
    }

    /// Hides the keyboard after one use.
    #[must_use]
    pub fn one_time(mut self) -> Self {
        self.one_time_keyboard = true;
        self
    }

    /// Asks clients to reply to the message.
    #[must_use]
    pub fn forcing_reply(mut self) -> Self {
        self.force_reply = true;
        self
    }
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Target chat.
    pub chat_id: i64,
    /// Message text.
    pub text: String,
    /// Formatting mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    /// Reply markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    /// Creates a plain-text message.
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    /// Sets Markdown parse mode.
    #[must_use]
    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }

    /// Attaches reply markup.
    #[must_use]
    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Query of a `getUpdates` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUpdates {
    /// First update to return; acknowledges everything before it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Long-poll timeout in seconds.
    pub timeout: u64,
    /// Update kinds to receive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,
}

impl GetUpdates {
    /// Long-polls for messages only.
    pub fn messages(offset: Option<i64>, timeout: u64) -> Self {
        Self {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        }
    }
}
