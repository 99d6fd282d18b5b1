// src/bot.rs
//! Chat front-end: command parsing, command handling and the long-poll loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::notify::telegram::TelegramClient;
use crate::notify::DeliverySink;
use crate::scan::{Delivery, ScanOutcome, Scanner};

pub const START_TEXT: &str = "👋 <b>Hackathon Finder Bot</b>\n\n\
Commands:\n\
/check - run scrapers now and get fresh results\n\
/file  - download the raw JSON results file\n\
/help  - list commands\n\n\
Bot also runs an initial scrape automatically on startup.";
pub const HELP_TEXT: &str = "/check, /file, /help";
pub const CHECK_PROGRESS_TEXT: &str = "⏳ Running scraper, please wait a few seconds...";
pub const NO_FILE_TEXT: &str = "No data file available. Run /check first.";

const POLL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Check,
    File,
}

impl Command {
    /// `/check`, `/check@SomeBot` and `/check extra words` all parse; plain text does not.
    pub fn parse(text: &str) -> Option<Command> {
        Self::parse_for(text, None)
    }

    /// Like [`Command::parse`], but when `own_username` is known a `/cmd@Name`
    /// addressed to a different bot is ignored.
    pub fn parse_for(text: &str, own_username: Option<&str>) -> Option<Command> {
        let word = text.split_whitespace().next()?;
        let cmd = word.strip_prefix('/')?;
        let (cmd, target) = match cmd.split_once('@') {
            Some((cmd, target)) => (cmd, Some(target)),
            None => (cmd, None),
        };
        if let (Some(target), Some(own)) = (target, own_username) {
            if !target.eq_ignore_ascii_case(own.trim_start_matches('@')) {
                return None;
            }
        }
        match cmd.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "check" => Some(Command::Check),
            "file" => Some(Command::File),
            _ => None,
        }
    }
}

pub struct Bot {
    scanner: Scanner,
}

impl Bot {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub async fn handle(&self, sink: &dyn DeliverySink, chat_id: i64, cmd: Command) -> Result<()> {
        tracing::info!(chat_id, command = ?cmd, "command received");
        match cmd {
            Command::Start => sink.send_text(chat_id, START_TEXT).await,
            Command::Help => sink.send_text(chat_id, HELP_TEXT).await,
            Command::File => {
                let store = self.scanner.store();
                match store.read_raw().await {
                    Some(bytes) => sink.send_file(chat_id, &store.file_name(), bytes).await,
                    None => sink.send_text(chat_id, NO_FILE_TEXT).await,
                }
            }
            Command::Check => {
                sink.send_text(chat_id, CHECK_PROGRESS_TEXT).await?;
                let outcome = self.scanner.run().await;
                self.deliver(sink, chat_id, &outcome).await
            }
        }
    }

    /// Run a scan and push it to `chat_id` (startup and scheduled runs).
    pub async fn scan_and_push(&self, sink: &dyn DeliverySink, chat_id: i64) -> Result<()> {
        let outcome = self.scanner.run().await;
        self.deliver(sink, chat_id, &outcome).await
    }

    async fn deliver(
        &self,
        sink: &dyn DeliverySink,
        chat_id: i64,
        outcome: &ScanOutcome,
    ) -> Result<()> {
        if let Some(err) = &outcome.save_error {
            let note = format!(
                "⚠️ Results could not be saved: {}",
                html_escape::encode_text(err)
            );
            sink.send_text(chat_id, &note).await?;
        }
        match outcome.delivery(&self.scanner.store().file_name()) {
            Delivery::Inline(text) => sink.send_text(chat_id, &text).await,
            Delivery::File { name, bytes } => sink.send_file(chat_id, &name, bytes).await,
        }
    }
}

/// Long-poll Telegram forever, dispatching commands one at a time.
pub async fn run_polling(bot: Arc<Bot>, client: TelegramClient) -> Result<()> {
    let mut offset: i64 = 0;
    let own_username = match client.get_me().await {
        Ok(me) => me.username,
        Err(e) => {
            tracing::warn!(error = ?e, "getMe failed; accepting commands addressed to any bot");
            None
        }
    };
    tracing::info!(username = ?own_username, "listening for commands");
    loop {
        let updates = match client.get_updates(offset, POLL_SECS).await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(error = ?e, "poll failed");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(msg) = update.message else {
                continue;
            };
            let Some(cmd) = msg
                .text
                .as_deref()
                .and_then(|t| Command::parse_for(t, own_username.as_deref()))
            else {
                continue;
            };
            if let Err(e) = bot.handle(&client, msg.chat.id, cmd).await {
                tracing::warn!(chat_id = msg.chat.id, command = ?cmd, error = ?e, "delivery failed");
            }
        }
    }
}
