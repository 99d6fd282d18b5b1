// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::bot::Bot;
use crate::ingest::ensure_metrics_described;
use crate::notify::DeliverySink;

#[derive(Clone, Copy, Debug)]
pub struct ScanSchedulerCfg {
    pub interval_secs: u64,
    pub chat_id: i64,
}

/// Periodically scan and push the digest. The first tick is skipped because
/// startup already ran a scan. Runs are not coordinated with `/check`.
pub fn spawn_scan_scheduler(
    cfg: ScanSchedulerCfg,
    bot: Arc<Bot>,
    sink: Arc<dyn DeliverySink>,
) -> JoinHandle<()> {
    ensure_metrics_described();
    tokio::spawn(async move {
        let mut ticker = scan_ticker(cfg.interval_secs);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            counter!("scan_scheduled_runs_total").increment(1);
            match bot.scan_and_push(sink.as_ref(), cfg.chat_id).await {
                Ok(()) => tracing::info!(chat_id = cfg.chat_id, "scheduled digest sent"),
                Err(e) => tracing::warn!(chat_id = cfg.chat_id, error = ?e, "scheduled digest failed"),
            }
        }
    })
}

/// A scan slower than the interval must not cause catch-up pushes.
fn scan_ticker(interval_secs: u64) -> Interval {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
