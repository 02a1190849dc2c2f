//! One-shot queries: the same replies the bot gives, printed to stdout.

use botelho_core::format::{
    SPACE_EMOJIS, discovery_failure, event_message, finance_message, occupancy_message,
    status_message,
};
use botelho_server::DiscoveryOutcome;
use chrono::Utc;

use crate::commands::Remotes;
use crate::config::BotConfig;
use crate::error::ClientResult;

fn connect(config: &BotConfig) -> ClientResult<(Remotes, chrono_tz::Tz)> {
    let server = config.server_config()?;
    Ok((Remotes::from_config(config, &server)?, server.timezone))
}

/// Prints the open/closed status.
pub async fn status(config: &BotConfig) -> ClientResult<()> {
    let (remotes, timezone) = connect(config)?;
    let status = remotes.spacenet.status().await?;
    println!("{}", status_message(&status, timezone));
    Ok(())
}

/// Prints who is in the space.
pub async fn who(config: &BotConfig) -> ClientResult<()> {
    let (remotes, _) = connect(config)?;
    let occupancy = remotes.spacenet.occupancy().await?;
    println!("{}", occupancy_message(&occupancy, SPACE_EMOJIS[0], false));
    Ok(())
}

/// Prints the next event, or the apology when no source has one.
pub async fn when(config: &BotConfig) -> ClientResult<()> {
    let (remotes, timezone) = connect(config)?;
    let now = Utc::now();
    match remotes.discovery.discover(now).await {
        DiscoveryOutcome::Found { event, phase, source } => {
            println!("{}", event_message(&event, phase, now, timezone));
            println!("({})", source);
        }
        DiscoveryOutcome::NoEventsFound { attempted } => {
            println!("{}", discovery_failure(&attempted));
        }
    }
    Ok(())
}

/// Prints this month's finances.
pub async fn finances(config: &BotConfig) -> ClientResult<()> {
    let (remotes, _) = connect(config)?;
    let finances = remotes.finance.finances().await?;
    println!("{}", finance_message(&finances));
    Ok(())
}
