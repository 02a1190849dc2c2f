//! Bot API wire types and chat command parsing for botelho.
//!
//! The bot talks to the Telegram Bot API over HTTPS. Every response is
//! wrapped in an [`ApiResponse`] envelope:
//!
//! - `ok`: whether the call succeeded
//! - `result`: the payload on success
//! - `description` / `error_code`: details on failure
//!
//! # Example
//!
//! ```rust
//! use botelho_protocol::{Command, Update, decode_response};
//!
//! let body = br#"{"ok":true,"result":[{"update_id":1,"message":{
//!     "message_id":1,"chat":{"id":-5,"type":"group"},"text":"/quem"}}]}"#;
//! let updates: Vec<Update> = decode_response(body).unwrap();
//! let message = updates[0].message.as_ref().unwrap();
//! assert_eq!(Command::parse(message), Some(Command::Who));
//! ```

mod command;
mod error;
mod types;

pub use command::Command;
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    ApiResponse, Chat, GetUpdates, KeyboardButton, Message, ParseMode, ReplyMarkup, SendMessage,
    Update, User, decode_response,
};
