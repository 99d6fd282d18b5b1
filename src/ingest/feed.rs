// src/ingest/feed.rs
//! Generic RSS / Atom reader. RSS `<item>` nodes first; when none are found the
//! same document is read again as Atom `<entry>` nodes.

use metrics::histogram;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::fetch::{fetch_text, Fetch};
use crate::ingest::types::Item;
use crate::ingest::url::{find_embedded_url, normalize_url};
use crate::ingest::{clean_text, deadline::extract_deadline};

pub const DEFAULT_FEED_LIMIT: usize = 40;

#[derive(Debug, Default)]
struct FeedNode {
    title: String,
    link: String,
    guid: String,
    href: String,
    /// `href` came from a `rel="alternate"` (or rel-less) link.
    href_is_alternate: bool,
    raw: String,
}

/// Fetch `url` and parse it as a feed. Empty on fetch failure.
pub async fn parse_feed(fetcher: &dyn Fetch, url: &str, limit: usize) -> Vec<Item> {
    let body = fetch_text(fetcher, url).await;
    if body.is_empty() {
        return Vec::new();
    }
    parse_feed_str(&body, url, limit)
}

pub fn parse_feed_str(xml: &str, feed_url: &str, limit: usize) -> Vec<Item> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(xml);

    let mut out = Vec::new();
    for node in collect_nodes(&xml, b"item", limit) {
        let title = clean_text(&node.title);
        if title.is_empty() {
            continue;
        }
        let url = first_resolved(
            [
                node.link.trim().to_string(),
                node.guid.trim().to_string(),
                find_embedded_url(&node.raw).unwrap_or_default(),
            ],
            feed_url,
        );
        let deadline = extract_deadline(&title);
        out.push(Item::new(title, url).with_deadline(deadline));
    }

    if out.is_empty() {
        for node in collect_nodes(&xml, b"entry", limit) {
            let title = clean_text(&node.title);
            if title.is_empty() {
                continue;
            }
            let url = first_resolved(
                [
                    node.href.trim().to_string(),
                    find_embedded_url(&node.raw).unwrap_or_default(),
                ],
                feed_url,
            );
            let deadline = extract_deadline(&title);
            out.push(Item::new(title, url).with_deadline(deadline));
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("scan_feed_parse_ms").record(ms);
    out
}

/// First candidate that normalizes to a usable URL, else the feed URL itself.
fn first_resolved<const N: usize>(candidates: [String; N], feed_url: &str) -> String {
    candidates
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| normalize_url(c, Some(feed_url)))
        .find(|u| !u.is_empty())
        .unwrap_or_else(|| feed_url.to_string())
}

/// Walk the document and gather every `node_tag` element (up to `limit`).
fn collect_nodes(xml: &str, node_tag: &[u8], limit: usize) -> Vec<FeedNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    let mut current: Option<FeedNode> = None;
    // child element names below the current node, outermost first
    let mut stack: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                match current.as_mut() {
                    None if name == node_tag => {
                        current = Some(FeedNode::default());
                        stack.clear();
                    }
                    None => {}
                    Some(node) => {
                        absorb_attributes(node, &e, &name);
                        stack.push(name);
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(node) = current.as_mut() {
                    let name = e.local_name().as_ref().to_vec();
                    absorb_attributes(node, &e, &name);
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(node) = current.as_mut() {
                    let text = match t.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(_) => String::from_utf8_lossy(&t).into_owned(),
                    };
                    push_text(node, stack.first().map(Vec::as_slice), &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(node) = current.as_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    push_text(node, stack.first().map(Vec::as_slice), &text);
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() {
                    if stack.pop().is_none() {
                        if let Some(done) = current.take() {
                            nodes.push(done);
                        }
                        if nodes.len() >= limit {
                            break;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(
                    target: "ingest",
                    error = %e,
                    position = reader.buffer_position(),
                    "feed xml error, keeping nodes read so far"
                );
                break;
            }
            _ => {}
        }
    }

    nodes
}

fn absorb_attributes(node: &mut FeedNode, e: &BytesStart<'_>, name: &[u8]) {
    let mut href = None;
    let mut rel = None;
    for attr in e.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value.to_string()),
            b"rel" => rel = Some(value.trim().to_ascii_lowercase()),
            _ => {}
        }
        node.raw.push(' ');
        node.raw.push_str(&value);
    }

    if name != b"link" || node.href_is_alternate {
        return;
    }
    let Some(href) = href.filter(|h| !h.trim().is_empty()) else {
        return;
    };
    // Blogger lists replies/edit/self links ahead of the post link.
    let alternate = matches!(rel.as_deref(), None | Some("alternate"));
    if alternate || node.href.is_empty() {
        node.href = href;
        node.href_is_alternate = alternate;
    }
}

fn push_text(node: &mut FeedNode, field: Option<&[u8]>, text: &str) {
    let target = match field {
        Some(b"title") => Some(&mut node.title),
        Some(b"link") => Some(&mut node.link),
        Some(b"guid") => Some(&mut node.guid),
        _ => None,
    };
    if let Some(buf) = target {
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(text);
    }
    node.raw.push(' ');
    node.raw.push_str(text);
}

/// Feeds routinely carry HTML-only entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
