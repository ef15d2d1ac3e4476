use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use hirewire_core::config::DiscordConfig;
use hirewire_core::outbound::Outbound;
use hirewire_store::InterviewStore;

use crate::handler::InterviewHandler;

/// Discord adapter.
///
/// Wraps a serenity `Client` and drives the event loop for the lifetime
/// of the process, reconnecting whenever the gateway drops.
pub struct DiscordAdapter {
    store: Arc<InterviewStore>,
    config: DiscordConfig,
    ready_tx: Arc<watch::Sender<bool>>,
}

impl DiscordAdapter {
    pub fn new(
        config: &DiscordConfig,
        store: Arc<InterviewStore>,
        ready_tx: Arc<watch::Sender<bool>>,
    ) -> Self {
        Self {
            store,
            config: config.clone(),
            ready_tx,
        }
    }

    /// Connect and keep reconnecting whenever the gateway drops. Never
    /// returns.
    ///
    /// The delivery task is spawned once with the first client's
    /// `Arc<Http>` (REST, not the gateway WebSocket), so it keeps
    /// working across reconnects.
    pub async fn run(self, delivery_rx: mpsc::Receiver<Outbound>) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        // Retry indefinitely until the initial connection succeeds.
        let first_client = loop {
            match self.build_client(intents).await {
                Ok(client) => break client,
                Err(e) => {
                    error!("Discord: initial connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        };

        let http = Arc::clone(&first_client.http);
        tokio::spawn(crate::delivery::run_delivery(http, delivery_rx));

        let mut client = first_client;
        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;

            client = loop {
                match self.build_client(intents).await {
                    Ok(client) => break client,
                    Err(e) => {
                        error!("Discord: reconnect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };
        }
    }

    /// Build a fresh serenity `Client` wired to our command handler.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = InterviewHandler {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            ready_tx: Arc::clone(&self.ready_tx),
        };

        Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
