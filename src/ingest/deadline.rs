// src/ingest/deadline.rs
//! Best-effort deadline recognition. An ordered list of formats, first match wins.

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;

const DATE_FORMATS: [&str; 7] = [
    "%d %b %Y",  // 12 Jan 2025
    "%d %B %Y",  // 12 January 2025
    "%b %d, %Y", // Jan 12, 2025
    "%B %d, %Y", // January 12, 2025
    "%Y-%m-%d",  // 2025-01-12
    "%d/%m/%Y",  // 12/01/2025
    "%m/%d/%Y",  // 01/13/2025
];

/// Parse a date string with the ordered format list.
pub fn parse_any_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn date_patterns() -> &'static [Regex] {
    static RES: OnceCell<Vec<Regex>> = OnceCell::new();
    RES.get_or_init(|| {
        [
            r"\b\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}\b",
            r"\b[A-Za-z]{3,9}\s+\d{1,2},\s*\d{4}\b",
            r"\b\d{4}-\d{2}-\d{2}\b",
            r"\b\d{1,2}/\d{1,2}/\d{4}\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Find a recognizable date in free text and return it as `YYYY-MM-DD`.
pub fn extract_deadline(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    for re in date_patterns() {
        for m in re.find_iter(text) {
            if let Some(d) = parse_any_date(m.as_str()) {
                return Some(d.format("%Y-%m-%d").to_string());
            }
        }
    }
    None
}

/// Deadline value from a structured field: ISO when recognizable, raw otherwise.
pub fn normalize_deadline_field(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(d) = parse_any_date(raw) {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    // ISO timestamps such as 2025-10-01T23:59:00Z
    if let Some(d) = raw.get(..10).and_then(parse_any_date) {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    extract_deadline(raw).or_else(|| Some(raw.to_string()))
}
