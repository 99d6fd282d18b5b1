// src/scan.rs
//! One pipeline run: aggregate, filter, persist, render.

use crate::digest::{fits_inline, format_message};
use crate::filter::{apply_policies, FilterPolicy};
use crate::ingest::sources::SourceRegistry;
use crate::ingest::types::ResultSet;
use crate::ingest::{scrape_all, ScanOptions};
use crate::store::SnapshotStore;

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub results: ResultSet,
    pub digest: String,
    /// Set when the snapshot could not be written. The in-memory results are still valid.
    pub save_error: Option<String>,
}

/// How the digest reaches the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Inline(String),
    File { name: String, bytes: Vec<u8> },
}

impl ScanOutcome {
    /// Inline when the digest fits the channel, otherwise the snapshot JSON as a file.
    pub fn delivery(&self, file_name: &str) -> Delivery {
        if fits_inline(&self.digest) {
            return Delivery::Inline(self.digest.clone());
        }
        let bytes = self
            .results
            .to_json_pretty()
            .map(String::into_bytes)
            .unwrap_or_default();
        Delivery::File {
            name: file_name.to_string(),
            bytes,
        }
    }
}

pub struct Scanner {
    registry: SourceRegistry,
    policies: Vec<FilterPolicy>,
    store: SnapshotStore,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(
        registry: SourceRegistry,
        policies: Vec<FilterPolicy>,
        store: SnapshotStore,
        options: ScanOptions,
    ) -> Self {
        Self {
            registry,
            policies,
            store,
            options,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub async fn run(&self) -> ScanOutcome {
        let raw = scrape_all(&self.registry, self.options).await;
        let results = apply_policies(raw, &self.policies);

        let save_error = match self.store.save(&results).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(path = %self.store.path().display(), error = ?e, "snapshot save failed");
                Some(format!("{e:#}"))
            }
        };

        let digest = format_message(&results);
        tracing::info!(
            sources = results.len(),
            items = results.total_items(),
            digest_chars = digest.chars().count(),
            "scan finished"
        );

        ScanOutcome {
            results,
            digest,
            save_error,
        }
    }
}
