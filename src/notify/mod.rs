// src/notify/mod.rs
pub mod telegram;

use anyhow::Result;
use std::sync::Mutex;

/// Where digests go. Implementations do not retry.
#[async_trait::async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_file(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    File { chat_id: i64, name: String, bytes: Vec<u8> },
}

// --- Test helper ---
#[derive(Default)]
pub struct MockSink {
    pub calls: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DeliverySink for MockSink {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("mock delivery failure");
        }
        if let Ok(mut c) = self.calls.lock() {
            c.push(Sent::Text {
                chat_id,
                text: text.to_string(),
            });
        }
        Ok(())
    }

    async fn send_file(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        if self.fail {
            anyhow::bail!("mock delivery failure");
        }
        if let Ok(mut c) = self.calls.lock() {
            c.push(Sent::File {
                chat_id,
                name: file_name.to_string(),
                bytes,
            });
        }
        Ok(())
    }
}
