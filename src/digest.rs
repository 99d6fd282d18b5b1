// src/digest.rs
//! Telegram HTML digest. Length-agnostic: callers check `fits_inline`.

use crate::ingest::types::{Item, ResultSet};

pub const BANNER: &str = "🔥 <b>Latest Hackathons &amp; Challenges</b>";
pub const NOTHING_FOUND: &str = "😴 No active or upcoming hackathons found right now.";
/// Telegram rejects longer messages; above this the snapshot file is sent instead.
pub const MESSAGE_LIMIT: usize = 3800;
pub const ITEMS_PER_SOURCE: usize = 10;

pub fn format_item(item: &Item) -> String {
    let title = html_escape::encode_text(&item.title);
    let mut line = if item.url.is_empty() {
        format!("• {title}")
    } else {
        let href = html_escape::encode_double_quoted_attribute(&item.url);
        format!("• <a href=\"{href}\">{title}</a>")
    };
    if let Some(deadline) = item.deadline.as_deref().filter(|d| !d.trim().is_empty()) {
        line.push_str(&format!(
            " <b>(Deadline: {})</b>",
            html_escape::encode_text(deadline)
        ));
    }
    line
}

pub fn format_message(results: &ResultSet) -> String {
    let mut msg = format!("{BANNER}\n\n");
    let mut empty = true;

    for (source, items) in results.iter() {
        if items.is_empty() {
            continue;
        }
        empty = false;
        msg.push_str(&format!(
            "⭐ <b>{}</b>\n",
            html_escape::encode_text(&source.to_uppercase())
        ));
        for it in items.iter().take(ITEMS_PER_SOURCE) {
            msg.push_str(&format_item(it));
            msg.push('\n');
        }
        msg.push('\n');
    }

    if empty {
        return NOTHING_FOUND.to_string();
    }
    msg.trim().to_string()
}

/// Character count (not bytes) against the channel limit.
pub fn fits_inline(message: &str) -> bool {
    message.chars().count() < MESSAGE_LIMIT
}
