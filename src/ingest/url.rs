// src/ingest/url.rs
use once_cell::sync::OnceCell;
use regex::Regex;

fn embedded_url_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s"'<>]+"#).unwrap())
}

/// First absolute http(s) URL inside `s`, minus trailing punctuation.
pub fn find_embedded_url(s: &str) -> Option<String> {
    let m = embedded_url_re().find(s)?;
    let trimmed = m
        .as_str()
        .trim_end_matches(['.', ',', ';', ':', ')', '"', '\'']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve a noisy link into an absolute URL, or "" when nothing usable is there.
///
/// Order: embedded absolute URL, root-relative path against `base`,
/// anything already starting with `http`, otherwise empty.
pub fn normalize_url(raw: &str, base: Option<&str>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Some(found) = find_embedded_url(raw) {
        return found;
    }

    if raw.starts_with('/') {
        if let Some(base) = base {
            return resolve_against(base, raw);
        }
    }

    if raw.starts_with("http") {
        return raw.to_string();
    }

    String::new()
}

fn resolve_against(base: &str, path: &str) -> String {
    match url::Url::parse(base).and_then(|b| b.join(path)) {
        Ok(u) => u.to_string(),
        Err(_) => format!("{}{}", base.trim_end_matches('/'), path),
    }
}
