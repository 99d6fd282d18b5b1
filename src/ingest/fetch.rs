// src/ingest/fetch.rs
//! Best-effort HTTP GET. Every call returns a `Result`; the `fetch_text` /
//! `fetch_json` helpers turn failures into the empty/`None` sentinel and log them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

pub const USER_AGENT: &str = concat!("Mozilla/5.0 HackFinder/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("non-success status {0}")]
    Status(StatusCode),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no content for {0}")]
    Missing(String),
}

#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Text body, or "" on any failure.
pub async fn fetch_text(fetcher: &dyn Fetch, url: &str) -> String {
    match fetcher.get_text(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(target: "ingest", %url, error = %e, "fetch text failed");
            counter!("scan_fetch_errors_total").increment(1);
            String::new()
        }
    }
}

/// Parsed JSON, or `None` on any failure.
pub async fn fetch_json(fetcher: &dyn Fetch, url: &str) -> Option<Value> {
    match fetcher.get_json(url).await {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(target: "ingest", %url, error = %e, "fetch json failed");
            counter!("scan_fetch_errors_total").increment(1);
            None
        }
    }
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

/// Serves canned bodies by exact URL; anything else is `Missing`.
#[derive(Debug, Default, Clone)]
pub struct FixtureFetcher {
    bodies: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl Fetch for FixtureFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Missing(url.to_string()))
    }
}
