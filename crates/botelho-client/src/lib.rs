//! CLI, configuration and wiring for botelho.
//!
//! This crate provides the `botelho` binary: it loads `config.toml`, starts
//! the bot (`botelho run`) or answers a single query from the terminal.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use config::BotConfig;
pub use error::{ClientError, ClientResult};
