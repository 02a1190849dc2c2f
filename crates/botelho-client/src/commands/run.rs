//! Run command: the bot in the foreground.
//!
//! Wires every task together:
//! - signal handler (SIGTERM/SIGINT)
//! - status poller
//! - funding monitor
//! - occupancy recorder, when a ThingSpeak key is configured
//! - Telegram update reader
//! - dispatcher, on the current task

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use botelho_providers::ThingSpeakClient;
use botelho_server::{
    Dispatcher, FundingMonitor, Inbound, OccupancyRecorder, PollerConfig, RemoteLookup,
    SignalHandler, StatusPoller, TelegramClient, status_channel,
};

use crate::commands::Remotes;
use crate::config::BotConfig;
use crate::error::ClientResult;

/// Capacity of the incoming chat message queue.
const MESSAGE_QUEUE: usize = 32;

/// Runs the bot until a shutdown signal is received.
pub async fn run(config: &BotConfig) -> ClientResult<()> {
    config.validate()?;
    let server_config = config.server_config()?;
    let token = config.telegram.resolve_token()?;
    if server_config.group_chat_id == 0 {
        warn!("telegram.group_id is not set; announcements will not reach a group");
    }

    let remotes = Remotes::from_config(config, &server_config)?;
    info!(
        sources = ?remotes.discovery.labels(),
        timezone = %server_config.timezone,
        "Starting bot"
    );

    let telegram = TelegramClient::new(
        &config.telegram.api_base,
        &token,
        config.telegram.poll_timeout,
    )?;

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    let (status_tx, status_rx) = status_channel();
    let (funding_tx, funding_rx) = mpsc::channel(1);
    let (message_tx, message_rx) = mpsc::channel(MESSAGE_QUEUE);

    let mut tasks = Vec::new();

    let poller = StatusPoller::new(PollerConfig {
        interval: server_config.status_interval,
        retry_backoff: server_config.status_retry_backoff,
    });
    let spacenet = remotes.spacenet.clone();
    tasks.push(tokio::spawn(poller.run(
        move || {
            let spacenet = spacenet.clone();
            async move { spacenet.status().await }
        },
        status_tx,
        signal_handler.shutdown(),
    )));

    let monitor = FundingMonitor::new(server_config.funding_interval, server_config.timezone);
    let finance = remotes.finance.clone();
    tasks.push(tokio::spawn(monitor.run(
        move || {
            let finance = finance.clone();
            async move { finance.finances().await }
        },
        funding_tx,
        signal_handler.shutdown(),
    )));

    match config.thingspeak.resolve_write_key()? {
        Some(key) => {
            let client =
                ThingSpeakClient::new(remotes.fetcher.clone(), &config.thingspeak.update_url, key)?;
            let recorder = OccupancyRecorder::new(server_config.metrics_interval, client);
            let spacenet = remotes.spacenet.clone();
            tasks.push(tokio::spawn(recorder.run(
                move || {
                    let spacenet = spacenet.clone();
                    async move { spacenet.occupancy().await }
                },
                signal_handler.shutdown(),
            )));
        }
        None => info!("No ThingSpeak write key; occupancy history disabled"),
    }

    tasks.push(tokio::spawn(
        telegram
            .clone()
            .run_updates(message_tx, signal_handler.shutdown()),
    ));

    let dispatcher = Dispatcher::new(
        &server_config,
        Arc::new(telegram),
        Arc::new(RemoteLookup::new(remotes.spacenet, remotes.finance)),
        remotes.discovery,
    );
    let inbound = Inbound {
        status: status_rx,
        funding: funding_rx,
        messages: message_rx,
    };
    dispatcher.run(inbound, signal_handler.shutdown()).await;

    info!("Shutting down...");
    signal_handler.trigger_shutdown();

    let drain = async {
        for task in tasks {
            let _ = task.await;
        }
    };
    if tokio::time::timeout(server_config.shutdown_timeout, drain)
        .await
        .is_err()
    {
        warn!("Background tasks did not stop in time");
    }

    info!("Bot stopped");
    Ok(())
}
