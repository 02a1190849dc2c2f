//! botelho CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use botelho_client::cli::{Cli, Command, ConfigAction};
use botelho_client::commands;
use botelho_client::config::BotConfig;
use botelho_client::error::ClientResult;
use botelho_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => BotConfig::load_from(path)?,
        None => BotConfig::load()?,
    };

    match cli.command() {
        Command::Run => commands::run::run(&config).await,
        Command::Status => commands::query::status(&config).await,
        Command::Who => commands::query::who(&config).await,
        Command::When => commands::query::when(&config).await,
        Command::Finances => commands::query::finances(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, cli.config.as_deref()),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
        },
    }
}
