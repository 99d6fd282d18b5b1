// src/store.rs
//! Latest-snapshot store: one JSON file, replaced whole on every save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::ingest::types::ResultSet;

pub const DEFAULT_DATA_FILE: &str = "data.json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used for attachments.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
    }

    /// Write to a sibling temp file, then rename over the target.
    pub async fn save(&self, results: &ResultSet) -> Result<()> {
        let body = results.to_json_pretty().context("serialize snapshot")?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body.as_bytes())
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Last saved set; empty when missing or unreadable.
    pub async fn load(&self) -> ResultSet {
        match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(rs) => rs,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "snapshot corrupt");
                    ResultSet::new()
                }
            },
            Err(_) => ResultSet::new(),
        }
    }

    /// Exact file bytes, for sending the snapshot as-is.
    pub async fn read_raw(&self) -> Option<Vec<u8>> {
        fs::read(&self.path).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Item;

    #[tokio::test]
    async fn save_then_load_and_no_temp_left() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/data.json"));
        let mut rs = ResultSet::new();
        rs.insert("isro", vec![Item::new("अंतरिक्ष Hackathon", "https://isro/1")]);
        store.save(&rs).await.unwrap();

        assert_eq!(store.load().await, rs);
        let raw = String::from_utf8(store.read_raw().await.unwrap()).unwrap();
        assert!(raw.contains("अंतरिक्ष"));
        assert!(!dir.path().join("nested/data.json.tmp").exists());
        assert_eq!(store.file_name(), "data.json");
    }
}
