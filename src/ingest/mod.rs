// src/ingest/mod.rs
pub mod deadline;
pub mod feed;
pub mod fetch;
pub mod html;
pub mod json;
pub mod sources;
pub mod types;
pub mod url;

use std::collections::HashSet;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::ingest::sources::SourceRegistry;
use crate::ingest::types::{Item, ResultSet};

pub const DEFAULT_SCAN_DELAY_MS: u64 = 200;
pub const DEFAULT_ADAPTER_TIMEOUT_SECS: u64 = 60;
const TITLE_MAX_CHARS: usize = 300;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_items_total", "Items kept per source after normalization.");
        describe_counter!("scan_dedup_total", "Items removed as (title, url) duplicates.");
        describe_counter!(
            "scan_adapter_errors_total",
            "Adapters that failed or timed out."
        );
        describe_counter!("scan_fetch_errors_total", "Failed HTTP fetches.");
        describe_counter!("scan_scheduled_runs_total", "Scheduled scan-and-push runs.");
        describe_histogram!("scan_adapter_ms", "Adapter run time in milliseconds.");
        describe_histogram!("scan_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("scan_last_run_ts", "Unix ts when the aggregator last ran.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 4) Length cap
    if out.chars().count() > TITLE_MAX_CHARS {
        out = out.chars().take(TITLE_MAX_CHARS).collect();
        out.truncate(out.trim_end().len());
    }

    out
}

/// Case-insensitive substring match. An empty keyword list accepts everything.
pub fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = title.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Drop repeated (title, url) pairs, case-insensitively. First occurrence wins.
pub fn dedupe<I, T>(items: I) -> Vec<Item>
where
    I: IntoIterator<Item = T>,
    T: Into<Item>,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out = Vec::new();
    for it in items {
        let it: Item = it.into();
        let key = (it.title.trim().to_lowercase(), it.url.to_lowercase());
        if seen.insert(key) {
            out.push(it);
        }
    }
    out
}

/// Bring adapter output to the canonical shape: clean title (drop empties),
/// re-normalize the url, then dedupe.
pub fn canonicalize(items: Vec<Item>) -> (Vec<Item>, usize) {
    let cleaned: Vec<Item> = items
        .into_iter()
        .filter_map(|mut it| {
            it.title = clean_text(&it.title);
            if it.title.is_empty() {
                return None;
            }
            it.url = url::normalize_url(&it.url, None);
            Some(it)
        })
        .collect();
    let before = cleaned.len();
    let out = dedupe(cleaned);
    let removed = before - out.len();
    (out, removed)
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Pause after each adapter.
    pub delay: Duration,
    /// Upper bound for a single adapter run.
    pub adapter_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
            adapter_timeout: Duration::from_secs(DEFAULT_ADAPTER_TIMEOUT_SECS),
        }
    }
}

/// Run every adapter in registry order, one at a time. A failing or timed out
/// adapter contributes an empty list; the run always completes.
pub async fn scrape_all(registry: &SourceRegistry, opts: ScanOptions) -> ResultSet {
    ensure_metrics_described();

    let mut results = ResultSet::new();
    for adapter in registry.adapters() {
        let name = adapter.name().to_string();
        let t0 = std::time::Instant::now();

        let items = match tokio::time::timeout(opts.adapter_timeout, adapter.fetch_latest()).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                tracing::warn!(target: "ingest", source = %name, error = ?e, "adapter failed");
                counter!("scan_adapter_errors_total").increment(1);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    target: "ingest",
                    source = %name,
                    timeout_secs = opts.adapter_timeout.as_secs(),
                    "adapter timed out"
                );
                counter!("scan_adapter_errors_total").increment(1);
                Vec::new()
            }
        };

        let (items, dup) = canonicalize(items);
        histogram!("scan_adapter_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("scan_items_total").increment(items.len() as u64);
        counter!("scan_dedup_total").increment(dup as u64);
        tracing::info!(target: "ingest", source = %name, count = items.len(), "source scanned");

        results.insert(name, items);

        if !opts.delay.is_zero() {
            tokio::time::sleep(opts.delay).await;
        }
    }

    let now = chrono::Utc::now().timestamp().max(0);
    gauge!("scan_last_run_ts").set(now as f64);
    results
}
