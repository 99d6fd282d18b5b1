// src/config.rs
//! Environment configuration and source-registry overrides.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::FilterPolicy;
use crate::ingest::fetch::DEFAULT_TIMEOUT_SECS;
use crate::ingest::sources::{default_descriptors, SourceDescriptor};
use crate::ingest::{DEFAULT_ADAPTER_TIMEOUT_SECS, DEFAULT_SCAN_DELAY_MS};
use crate::store::DEFAULT_DATA_FILE;

pub const PLACEHOLDER_TOKEN: &str = "PUT_YOUR_TOKEN_HERE";

pub const ENV_BOT_TOKEN: &str = "HF_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "HF_CHAT_ID";
pub const ENV_DATA_FILE: &str = "HF_DATA_FILE";
pub const ENV_FILTERS: &str = "HF_FILTERS";
pub const ENV_SCAN_DELAY_MS: &str = "HF_SCAN_DELAY_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "HF_REQUEST_TIMEOUT_SECS";
pub const ENV_ADAPTER_TIMEOUT_SECS: &str = "HF_ADAPTER_TIMEOUT_SECS";
pub const ENV_SCAN_INTERVAL_SECS: &str = "HF_SCAN_INTERVAL_SECS";
pub const ENV_SOURCES_PATH: &str = "HF_SOURCES_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bot_token: String,
    pub chat_id: Option<i64>,
    pub data_file: PathBuf,
    pub filters: Vec<FilterPolicy>,
    pub scan_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub adapter_timeout_secs: u64,
    /// 0 disables the periodic push.
    pub scan_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let num = |key: &str, default: u64| -> u64 {
            get(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let bot_token = get(ENV_BOT_TOKEN)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TOKEN.to_string());

        let chat_id = match get(ENV_CHAT_ID).map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => Some(
                v.parse::<i64>()
                    .with_context(|| format!("{ENV_CHAT_ID} is not a chat id: {v}"))?,
            ),
            _ => None,
        };

        let filters = match get(ENV_FILTERS) {
            Some(raw) => parse_filters(&raw)?,
            None => vec![FilterPolicy::Light],
        };

        Ok(Self {
            bot_token,
            chat_id,
            data_file: get(ENV_DATA_FILE)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            filters,
            scan_delay_ms: num(ENV_SCAN_DELAY_MS, DEFAULT_SCAN_DELAY_MS),
            request_timeout_secs: num(ENV_REQUEST_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS),
            adapter_timeout_secs: num(ENV_ADAPTER_TIMEOUT_SECS, DEFAULT_ADAPTER_TIMEOUT_SECS),
            scan_interval_secs: num(ENV_SCAN_INTERVAL_SECS, 0),
        })
    }

    pub fn has_placeholder_token(&self) -> bool {
        self.bot_token == PLACEHOLDER_TOKEN
    }
}

/// `light,deadline` -> both, in order. `none` or an empty list disables filtering.
pub fn parse_filters(raw: &str) -> Result<Vec<FilterPolicy>> {
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if part.eq_ignore_ascii_case("none") {
            continue;
        }
        let policy: FilterPolicy = part.parse()?;
        if !out.contains(&policy) {
            out.push(policy);
        }
    }
    Ok(out)
}

/// Load descriptors from an explicit path. Supports TOML (`[[source]]`) or a JSON array.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Descriptors using env var + fallbacks:
/// 1) $HF_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in registry
pub fn load_sources_default() -> Result<Vec<SourceDescriptor>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_descriptors())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDescriptor>> {
    let parsed = match hint_ext {
        "json" => parse_json(s).or_else(|_| parse_toml(s)),
        _ => parse_toml(s).or_else(|_| parse_json(s)),
    }
    .map_err(|e| anyhow!("unsupported sources format: {e}"))?;
    check_names(&parsed)?;
    Ok(parsed)
}

fn parse_toml(s: &str) -> Result<Vec<SourceDescriptor>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        source: Vec<SourceDescriptor>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(v.source)
}

fn parse_json(s: &str) -> Result<Vec<SourceDescriptor>> {
    Ok(serde_json::from_str(s)?)
}

fn check_names(sources: &[SourceDescriptor]) -> Result<()> {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    for d in sources {
        if d.name.trim().is_empty() {
            return Err(anyhow!("source with empty name"));
        }
        if !seen.insert(d.name.as_str()) {
            return Err(anyhow!("duplicate source name: {}", d.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sources::EndpointKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(cfg.has_placeholder_token());
        assert_eq!(cfg.chat_id, None);
        assert_eq!(cfg.data_file, PathBuf::from("data.json"));
        assert_eq!(cfg.filters, vec![FilterPolicy::Light]);
        assert_eq!(cfg.request_timeout_secs, 15);
        assert_eq!(cfg.scan_interval_secs, 0);
    }

    #[test]
    fn explicit_values_and_bad_numbers() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_BOT_TOKEN, "123:abc"),
            (ENV_CHAT_ID, "-1001234"),
            (ENV_FILTERS, "deadline, light, deadline"),
            (ENV_SCAN_DELAY_MS, "not-a-number"),
        ]))
        .unwrap();
        assert!(!cfg.has_placeholder_token());
        assert_eq!(cfg.chat_id, Some(-1001234));
        assert_eq!(cfg.filters, vec![FilterPolicy::Deadline, FilterPolicy::Light]);
        assert_eq!(cfg.scan_delay_ms, DEFAULT_SCAN_DELAY_MS);
    }

    #[test]
    fn bad_chat_id_and_filter_are_errors() {
        assert!(AppConfig::from_lookup(lookup(&[(ENV_CHAT_ID, "me")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(ENV_FILTERS, "smart")])).is_err());
        assert!(parse_filters("none").unwrap().is_empty());
    }

    #[test]
    fn toml_sources_fill_defaults() {
        let toml = r#"
[[source]]
name = "devpost"
primary = { kind = "json", url = "https://devpost.com/api/hackathons" }
keywords = ["hack"]

[[source]]
name = "nic"
primary = { kind = "html", url = "https://www.nic.in/news/" }
selectors = ["h2", "h3"]
"#;
        let v = parse_sources(toml, "toml").unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].primary.kind, EndpointKind::Json);
        assert_eq!(v[0].title_fields, vec!["title", "name", "headline"]);
        assert_eq!(v[1].selectors, vec!["h2", "h3"]);
        assert!(v[1].fallback.is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let json = r#"[
            {"name":"a","primary":{"kind":"rss","url":"https://a/rss"}},
            {"name":"a","primary":{"kind":"html","url":"https://a/"}}
        ]"#;
        assert!(parse_sources(json, "json").is_err());
    }
}
