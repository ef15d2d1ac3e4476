use std::sync::Arc;

use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hirewire=info".into()),
        )
        .init();

    // Config: explicit HIREWIRE_CONFIG path > ~/.hirewire/hirewire.toml.
    // A missing bot token or channel id fails extraction; the process
    // must not start without a delivery target.
    let config_path = std::env::var("HIREWIRE_CONFIG").ok();
    let config = hirewire_core::HirewireConfig::load(config_path.as_deref())?;
    let tz = config.tz()?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, timezone = %config.timezone, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // Runs the schema migrations (idempotent, adds the time column to
    // legacy tables).
    let store = Arc::new(hirewire_store::InterviewStore::new(db, tz)?);

    // Job output → Discord delivery task.
    let (outbound_tx, outbound_rx) = tokio::sync::mpsc::channel(64);
    // Gateway-ready gate: jobs hold their first tick until connected.
    let (ready_tx, ready_rx) = tokio::sync::watch::channel(false);
    // Flipping this stops both jobs as a unit.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let runner = hirewire_scheduler::JobRunner::new(
        Arc::clone(&store),
        outbound_tx,
        config.discord.channel_id,
        tz,
        &config.jobs,
    );
    runner.spawn(ready_rx, shutdown_rx);

    let adapter = hirewire_discord::DiscordAdapter::new(
        &config.discord,
        Arc::clone(&store),
        Arc::new(ready_tx),
    );
    tokio::spawn(async move { adapter.run(outbound_rx).await });
    info!("Discord bot starting");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    let _ = shutdown_tx.send(true);
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
