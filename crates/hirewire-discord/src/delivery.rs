//! Background delivery — posts job-produced messages to Discord.

use std::sync::Arc;

use serenity::model::id::ChannelId;
use tokio::sync::mpsc;
use tracing::{info, warn};

use hirewire_core::outbound::Outbound;

/// Receives messages from the job runner and posts them over REST.
///
/// Spawned once after the first gateway client is built; the `Http`
/// handle stays valid across gateway reconnects, so the task never
/// needs restarting. A failed send is logged and the message dropped;
/// the jobs do not retry within a tick.
pub async fn run_delivery(http: Arc<serenity::http::Http>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(out) = rx.recv().await {
        let channel = ChannelId::new(out.channel_id);
        if let Err(e) = crate::send::send_chunked(&http, channel, &out.text).await {
            warn!(channel_id = out.channel_id, error = %e, "outbound delivery failed");
        }
    }
    info!("delivery task exiting (channel closed)");
}
