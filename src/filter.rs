// src/filter.rs
//! Relevance and deadline policies. Each works per source and keeps item order.

use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use metrics::counter;

use crate::ingest::deadline::parse_any_date;
use crate::ingest::types::{Item, ResultSet};

pub const BLOCKLIST: [&str; 7] = [
    "webinar",
    "bootcamp",
    "workshop",
    "seminar",
    "summit",
    "training",
    "announcement",
];

pub const ALLOWLIST: [&str; 7] = [
    "hack",
    "challenge",
    "competition",
    "contest",
    "innovation",
    "fellowship",
    "student challenge",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Blocklist first, then require an allowlisted term.
    Light,
    /// Keep unknown or not-yet-passed deadlines.
    Deadline,
}

impl FromStr for FilterPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "keywords" => Ok(FilterPolicy::Light),
            "deadline" => Ok(FilterPolicy::Deadline),
            other => Err(anyhow!("unknown filter policy: {other}")),
        }
    }
}

pub fn passes_light_rules(title: &str) -> bool {
    let t = title.to_lowercase();
    if BLOCKLIST.iter().any(|b| t.contains(b)) {
        return false;
    }
    ALLOWLIST.iter().any(|a| t.contains(a))
}

/// Unknown or unparsable deadlines are kept.
pub fn passes_deadline(item: &Item, today: NaiveDate) -> bool {
    match item.deadline.as_deref().and_then(parse_any_date) {
        Some(d) => d >= today,
        None => true,
    }
}

pub fn filter_by_light_rules(results: ResultSet) -> ResultSet {
    retain_items(results, |it| passes_light_rules(&it.title))
}

pub fn filter_by_deadline(results: ResultSet, today: NaiveDate) -> ResultSet {
    retain_items(results, |it| passes_deadline(it, today))
}

/// Apply `policies` in order; today's date is taken from the local clock.
pub fn apply_policies(results: ResultSet, policies: &[FilterPolicy]) -> ResultSet {
    let today = chrono::Local::now().date_naive();
    apply_policies_on(results, policies, today)
}

pub fn apply_policies_on(
    results: ResultSet,
    policies: &[FilterPolicy],
    today: NaiveDate,
) -> ResultSet {
    policies.iter().fold(results, |acc, policy| match policy {
        FilterPolicy::Light => filter_by_light_rules(acc),
        FilterPolicy::Deadline => filter_by_deadline(acc, today),
    })
}

fn retain_items<F>(results: ResultSet, keep: F) -> ResultSet
where
    F: Fn(&Item) -> bool,
{
    results.map_items(|source, items| {
        let before = items.len();
        let kept: Vec<Item> = items.into_iter().filter(|it| keep(it)).collect();
        let dropped = before - kept.len();
        if dropped > 0 {
            tracing::debug!(target: "ingest", %source, dropped, "items filtered");
            counter!("scan_filtered_total").increment(dropped as u64);
        }
        kept
    })
}
