// src/ingest/json.rs
//! Field probing for undocumented JSON listings. The first present, non-empty
//! candidate wins.

use serde_json::Value;

use crate::ingest::deadline::normalize_deadline_field;
use crate::ingest::fetch::{fetch_json, Fetch};
use crate::ingest::types::Item;
use crate::ingest::url::normalize_url;
use crate::ingest::{clean_text, matches_keywords};

/// Field-name candidates, in probe order.
#[derive(Debug, Clone, Copy)]
pub struct JsonFields<'a> {
    pub list_keys: &'a [String],
    pub title: &'a [String],
    pub link: &'a [String],
    pub deadline: &'a [String],
    pub keywords: &'a [String],
}

pub async fn fetch_listing(fetcher: &dyn Fetch, url: &str, fields: JsonFields<'_>) -> Vec<Item> {
    match fetch_json(fetcher, url).await {
        Some(v) => items_from_value(&v, url, fields),
        None => Vec::new(),
    }
}

pub fn items_from_value(value: &Value, base: &str, fields: JsonFields<'_>) -> Vec<Item> {
    let Some(entries) = find_entries(value, fields.list_keys) else {
        tracing::debug!(target: "ingest", %base, "no item array in json");
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries {
        let title = clean_text(&first_string(entry, fields.title).unwrap_or_default());
        if title.is_empty() || !matches_keywords(&title, fields.keywords) {
            continue;
        }
        let link = first_string(entry, fields.link).unwrap_or_default();
        let url = normalize_url(&link, Some(base));
        let deadline =
            first_string(entry, fields.deadline).and_then(|d| normalize_deadline_field(&d));
        out.push(Item::new(title, url).with_deadline(deadline));
    }
    out
}

/// Top-level array, an array under one of `list_keys`, or one level deeper
/// (e.g. `{"data": {"items": [...]}}`).
fn find_entries<'v>(value: &'v Value, list_keys: &[String]) -> Option<&'v Vec<Value>> {
    if let Some(arr) = value.as_array() {
        return Some(arr);
    }
    let obj = value.as_object()?;
    for key in list_keys {
        if let Some(arr) = obj.get(key).and_then(Value::as_array) {
            return Some(arr);
        }
    }
    for key in list_keys {
        if let Some(inner) = obj.get(key).filter(|v| v.is_object()) {
            if let Some(arr) = find_entries(inner, list_keys) {
                return Some(arr);
            }
        }
    }
    None
}

fn first_string(entry: &Value, candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|key| match entry.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
