// src/lib.rs
// Public library surface for the bot binary and integration tests.

pub mod bot;
pub mod config;
pub mod digest;
pub mod filter;
pub mod ingest;
pub mod notify;
pub mod scan;
pub mod scheduler;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::ingest::types::{Item, ResultSet, SourceAdapter};
pub use crate::ingest::{dedupe, scrape_all, ScanOptions};
pub use crate::notify::DeliverySink;
pub use crate::scan::{Delivery, ScanOutcome, Scanner};

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::sources::{SourceDescriptor, SourceRegistry};
use crate::store::SnapshotStore;

/// Wire a scanner from configuration and the given source descriptors.
pub fn build_scanner(cfg: &AppConfig, descriptors: Vec<SourceDescriptor>) -> anyhow::Result<Scanner> {
    let fetcher = Arc::new(HttpFetcher::new(cfg.request_timeout_secs)?);
    let registry = SourceRegistry::from_descriptors(descriptors, fetcher);
    let options = ScanOptions {
        delay: Duration::from_millis(cfg.scan_delay_ms),
        adapter_timeout: Duration::from_secs(cfg.adapter_timeout_secs.max(1)),
    };
    Ok(Scanner::new(
        registry,
        cfg.filters.clone(),
        SnapshotStore::new(cfg.data_file.clone()),
        options,
    ))
}
