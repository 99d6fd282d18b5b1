//! Hackathon Finder: binary entrypoint.
//! Loads configuration, runs one scan on startup, then serves chat commands.

use std::sync::Arc;

use hackfinder::bot::{run_polling, Bot};
use hackfinder::config::{load_sources_default, AppConfig};
use hackfinder::notify::telegram::TelegramClient;
use hackfinder::notify::DeliverySink;
use hackfinder::scheduler::{spawn_scan_scheduler, ScanSchedulerCfg};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `HF_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hackfinder=info,warn"));

    let json = std::env::var("HF_LOG_JSON").ok().is_some_and(|v| v == "1");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    if cfg.has_placeholder_token() {
        tracing::warn!("HF_BOT_TOKEN not set; using the placeholder token, Telegram calls will fail");
    }

    let descriptors = load_sources_default()?;
    tracing::info!(sources = descriptors.len(), filters = ?cfg.filters, "bot starting");

    let scanner = hackfinder::build_scanner(&cfg, descriptors)?;
    let bot = Arc::new(Bot::new(scanner));
    let client = TelegramClient::new(cfg.bot_token.clone());

    match cfg.chat_id {
        Some(chat_id) => match bot.scan_and_push(&client, chat_id).await {
            Ok(()) => tracing::info!(chat_id, "initial scan completed and digest sent"),
            Err(e) => tracing::warn!(chat_id, error = ?e, "initial digest failed"),
        },
        None => tracing::warn!("HF_CHAT_ID not set; skipping initial digest push"),
    }

    if let (Some(chat_id), true) = (cfg.chat_id, cfg.scan_interval_secs > 0) {
        let sink: Arc<dyn DeliverySink> = Arc::new(client.clone());
        spawn_scan_scheduler(
            ScanSchedulerCfg {
                interval_secs: cfg.scan_interval_secs,
                chat_id,
            },
            bot.clone(),
            sink,
        );
    }

    run_polling(bot, client).await
}
