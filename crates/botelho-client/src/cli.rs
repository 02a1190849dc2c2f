//! Command-line interface definition.

use std::path::PathBuf;

use botelho_core::{TracingConfig, TracingOutputFormat};
use clap::{Parser, Subcommand};
use tracing::Level;

/// botelho - LHC's chat bot
#[derive(Debug, Parser)]
#[command(name = "botelho")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "BOTELHO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format: pretty, compact or json
    #[arg(long, value_parser = parse_log_format, global = true)]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run; the bot itself when none is given.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Run)
    }

    /// Logging setup for this invocation.
    ///
    /// The bot logs at info; one-shot commands only warn so their output
    /// stays readable. `--debug` wins over both.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::cli_debug()
        } else if matches!(self.command(), Command::Run) {
            TracingConfig::default()
        } else {
            TracingConfig::default().with_level(Level::WARN)
        };

        match self.log_format {
            Some(format) => config.with_format(format),
            None => config,
        }
    }
}

fn parse_log_format(value: &str) -> Result<TracingOutputFormat, String> {
    value.parse().map_err(|e: botelho_core::TracingError| e.to_string())
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the bot until SIGINT/SIGTERM
    Run,

    /// Print the space's open/closed status
    Status,

    /// Print who is in the space
    Who,

    /// Print the next event
    When,

    /// Print this month's finances
    Finances,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
