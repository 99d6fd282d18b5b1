// src/ingest/html.rs
//! Keyword scan over listing pages: headings and anchors whose text mentions
//! one of the relevance keywords.

use once_cell::sync::OnceCell;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::fetch::{fetch_text, Fetch};
use crate::ingest::types::Item;
use crate::ingest::url::normalize_url;
use crate::ingest::{clean_text, deadline::extract_deadline, matches_keywords};

/// What to look for on a page.
#[derive(Debug, Clone, Copy)]
pub struct HtmlScan<'a> {
    pub selectors: &'a [String],
    pub keywords: &'a [String],
    /// Read the title from this attribute instead of the element text.
    pub title_attr: Option<&'a str>,
}

pub async fn scan_page(fetcher: &dyn Fetch, page_url: &str, scan: HtmlScan<'_>) -> Vec<Item> {
    let body = fetch_text(fetcher, page_url).await;
    if body.is_empty() {
        return Vec::new();
    }
    scan_html(&body, page_url, scan)
}

fn anchor_selector() -> &'static Selector {
    static SEL: OnceCell<Selector> = OnceCell::new();
    SEL.get_or_init(|| Selector::parse("a[href]").unwrap())
}

/// Scan an HTML document. Elements are visited in document order.
pub fn scan_html(html: &str, page_url: &str, scan: HtmlScan<'_>) -> Vec<Item> {
    let joined = if scan.selectors.is_empty() {
        "a".to_string()
    } else {
        scan.selectors.join(", ")
    };
    let selector = match Selector::parse(&joined) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(target: "ingest", selector = %joined, error = ?e, "bad selector");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for el in document.select(&selector) {
        let raw_title = match scan.title_attr {
            Some(attr) => el.value().attr(attr).unwrap_or_default().to_string(),
            None => el.text().collect::<Vec<_>>().join(" "),
        };
        let title = clean_text(&raw_title);
        if title.is_empty() || !matches_keywords(&title, scan.keywords) {
            continue;
        }

        let href = element_href(&el).unwrap_or_default();
        let mut url = normalize_url(href, Some(page_url));
        if url.is_empty() {
            url = page_url.to_string();
        }
        let deadline = extract_deadline(&title);
        out.push(Item::new(title, url).with_deadline(deadline));
    }

    out
}

/// The element's own href, or the first descendant anchor's.
fn element_href<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    if let Some(href) = el.value().attr("href") {
        return Some(href);
    }
    el.select(anchor_selector())
        .next()
        .and_then(|a| a.value().attr("href"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn anchors_and_headings_resolve_links() {
        let html = r#"<html><body>
            <a href="/events/sih">Smart India   Hackathon 2025</a>
            <a href="/about">About us</a>
            <h3><a href="https://x.org/grand">Grand Challenge</a></h3>
            <h2>Open Innovation Challenge</h2>
        </body></html>"#;
        let sels = strings(&["a", "h2", "h3"]);
        let kws = strings(&["hackathon", "challenge"]);
        let items = scan_html(
            html,
            "https://gov.example.in/news",
            HtmlScan {
                selectors: &sels,
                keywords: &kws,
                title_attr: None,
            },
        );
        let got: Vec<(&str, &str)> = items
            .iter()
            .map(|i| (i.title.as_str(), i.url.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Smart India Hackathon 2025", "https://gov.example.in/events/sih"),
                ("Grand Challenge", "https://x.org/grand"),
                ("Grand Challenge", "https://x.org/grand"),
                ("Open Innovation Challenge", "https://gov.example.in/news"),
            ]
        );
    }

    #[test]
    fn title_attribute_and_empty_keywords() {
        let html = r#"<a class="card" title="Flatland Challenge" href="/challenges/flatland"><img/></a>
                      <a class="card" title="" href="/x"></a>"#;
        let sels = strings(&["a.card"]);
        let items = scan_html(
            html,
            "https://www.aicrowd.com/challenges",
            HtmlScan {
                selectors: &sels,
                keywords: &[],
                title_attr: Some("title"),
            },
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://www.aicrowd.com/challenges/flatland");
    }
}
