use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tokio::sync::watch;
use tracing::info;

use hirewire_core::config::DiscordConfig;
use hirewire_store::InterviewStore;

use crate::commands;

/// Serenity event handler: dispatches prefix commands and unblocks the
/// background jobs once the gateway is up.
pub struct InterviewHandler {
    pub store: Arc<InterviewStore>,
    pub config: DiscordConfig,
    pub ready_tx: Arc<watch::Sender<bool>>,
}

#[async_trait]
impl EventHandler for InterviewHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord bot connected");
        // First tick of the reminder/ranking jobs waits on this.
        let _ = self.ready_tx.send(true);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(rest) = msg.content.strip_prefix(self.config.command_prefix.as_str()) else {
            return;
        };
        let (command, args) = match rest.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (rest.trim(), ""),
        };
        if command.is_empty() {
            return;
        }

        commands::dispatch(self, &ctx, &msg, command, args).await;
    }
}
