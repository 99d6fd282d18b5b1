// tests/bot_commands.rs
use std::time::Duration;

use anyhow::Result;
use hackfinder::bot::{Bot, Command, CHECK_PROGRESS_TEXT, HELP_TEXT, NO_FILE_TEXT};
use hackfinder::filter::FilterPolicy;
use hackfinder::ingest::sources::SourceRegistry;
use hackfinder::notify::{MockSink, Sent};
use hackfinder::store::SnapshotStore;
use hackfinder::{Item, ScanOptions, Scanner, SourceAdapter};

struct Many {
    name: &'static str,
    n: usize,
}

#[async_trait::async_trait]
impl SourceAdapter for Many {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Ok((0..self.n)
            .map(|i| {
                Item::new(
                    format!("Global Open Innovation Hackathon edition {i}"),
                    format!("https://hack.example.org/editions/{i}"),
                )
            })
            .collect())
    }
    fn name(&self) -> &str {
        self.name
    }
}

fn bot_with(adapters: Vec<(&'static str, usize)>, store: SnapshotStore) -> Bot {
    let mut registry = SourceRegistry::new();
    for (name, n) in adapters {
        registry = registry.with_adapter(Many { name, n });
    }
    let scanner = Scanner::new(
        registry,
        vec![FilterPolicy::Light],
        store,
        ScanOptions {
            delay: Duration::ZERO,
            adapter_timeout: Duration::from_secs(5),
        },
    );
    Bot::new(scanner)
}

#[tokio::test]
async fn help_and_start_are_static() {
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_with(vec![], SnapshotStore::new(dir.path().join("data.json")));
    let sink = MockSink::new();

    bot.handle(&sink, 1, Command::Help).await.unwrap();
    bot.handle(&sink, 1, Command::Start).await.unwrap();

    let sent = sink.sent();
    assert_eq!(
        sent[0],
        Sent::Text {
            chat_id: 1,
            text: HELP_TEXT.to_string()
        }
    );
    assert!(matches!(&sent[1], Sent::Text { text, .. } if text.contains("/check")));
}

#[tokio::test]
async fn file_before_any_check_explains() {
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_with(vec![], SnapshotStore::new(dir.path().join("data.json")));
    let sink = MockSink::new();

    bot.handle(&sink, 5, Command::File).await.unwrap();
    assert_eq!(
        sink.sent(),
        vec![Sent::Text {
            chat_id: 5,
            text: NO_FILE_TEXT.to_string()
        }]
    );
}

#[tokio::test]
async fn check_replies_inline_then_file_returns_snapshot_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let bot = bot_with(vec![("many", 2)], SnapshotStore::new(&path));
    let sink = MockSink::new();

    bot.handle(&sink, 9, Command::Check).await.unwrap();
    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        Sent::Text {
            chat_id: 9,
            text: CHECK_PROGRESS_TEXT.to_string()
        }
    );
    assert!(matches!(&sent[1], Sent::Text { text, .. } if text.contains("edition 1")));

    bot.handle(&sink, 9, Command::File).await.unwrap();
    let on_disk = std::fs::read(&path).unwrap();
    match sink.sent().last().unwrap() {
        Sent::File { name, bytes, .. } => {
            assert_eq!(name, "data.json");
            assert_eq!(bytes, &on_disk);
        }
        other => panic!("expected file, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_digest_is_sent_as_file() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"];
    let adapters = names.iter().map(|n| (*n, 12)).collect();
    let bot = bot_with(adapters, SnapshotStore::new(dir.path().join("big.json")));
    let sink = MockSink::new();

    bot.scan_and_push(&sink, 3).await.unwrap();
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::File { chat_id, name, bytes } => {
            assert_eq!(*chat_id, 3);
            assert_eq!(name, "big.json");
            // the file carries every item, not just the ten shown per source
            let parsed: serde_json::Value = serde_json::from_slice(bytes).unwrap();
            assert_eq!(parsed["s8"].as_array().unwrap().len(), 12);
        }
        other => panic!("expected file, got {other:?}"),
    }
}

#[tokio::test]
async fn save_failure_is_reported_and_digest_still_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let bot = bot_with(vec![("many", 1)], SnapshotStore::new(blocker.join("data.json")));
    let sink = MockSink::new();

    bot.scan_and_push(&sink, 4).await.unwrap();
    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert!(matches!(&sent[0], Sent::Text { text, .. } if text.contains("could not be saved")));
    assert!(matches!(&sent[1], Sent::Text { text, .. } if text.contains("edition 0")));
}

#[tokio::test]
async fn delivery_errors_surface_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_with(vec![], SnapshotStore::new(dir.path().join("data.json")));
    let sink = MockSink::failing();
    assert!(bot.handle(&sink, 1, Command::Help).await.is_err());
}
