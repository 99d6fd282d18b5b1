// tests/metrics_scan.rs
#![cfg(feature = "strict-metrics")]
use std::time::Duration;

use anyhow::{anyhow, Result};
use hackfinder::ingest::sources::SourceRegistry;
use hackfinder::{scrape_all, Item, ScanOptions, SourceAdapter};
use metrics_exporter_prometheus::PrometheusBuilder;

struct Ok1;

#[async_trait::async_trait]
impl SourceAdapter for Ok1 {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Ok(vec![
            Item::new("Hack", "https://h/1"),
            Item::new("hack", "https://H/1"),
        ])
    }
    fn name(&self) -> &str {
        "ok"
    }
}

struct Err1;

#[async_trait::async_trait]
impl SourceAdapter for Err1 {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Err(anyhow!("boom"))
    }
    fn name(&self) -> &str {
        "err"
    }
}

#[tokio::test]
async fn metrics_exposed_after_scan() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let registry = SourceRegistry::new().with_adapter(Ok1).with_adapter(Err1);
    let opts = ScanOptions {
        delay: Duration::ZERO,
        adapter_timeout: Duration::from_secs(5),
    };
    let _ = scrape_all(&registry, opts).await;

    let out = handle.render();
    assert!(out.contains("scan_items_total"));
    assert!(out.contains("scan_dedup_total"));
    assert!(out.contains("scan_adapter_errors_total"));
    assert!(out.contains("scan_adapter_ms"));

    // described up front even though only the scheduler increments it
    metrics::counter!("scan_scheduled_runs_total").increment(1);
    let out = handle.render();
    assert!(out.contains("# HELP scan_scheduled_runs_total"));
}
