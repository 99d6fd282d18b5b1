// src/ingest/sources.rs
//! Declarative source descriptors and the single executor that runs them.
//!
//! Per-source variation lives in data: which endpoint to try first, where to
//! fall back, which selectors/fields to probe and which keywords make a title
//! relevant. `DescriptorAdapter` turns a descriptor into a `SourceAdapter`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingest::dedupe;
use crate::ingest::feed::{parse_feed, DEFAULT_FEED_LIMIT};
use crate::ingest::fetch::Fetch;
use crate::ingest::html::{scan_page, HtmlScan};
use crate::ingest::json::{fetch_listing, JsonFields};
use crate::ingest::types::{Item, SourceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Rss,
    Json,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub url: String,
}

impl Endpoint {
    pub fn rss(url: &str) -> Self {
        Self {
            kind: EndpointKind::Rss,
            url: url.to_string(),
        }
    }

    pub fn json(url: &str) -> Self {
        Self {
            kind: EndpointKind::Json,
            url: url.to_string(),
        }
    }

    pub fn html(url: &str) -> Self {
        Self {
            kind: EndpointKind::Html,
            url: url.to_string(),
        }
    }
}

fn default_selectors() -> Vec<String> {
    to_strings(&["a"])
}
fn default_list_keys() -> Vec<String> {
    to_strings(&[
        "hackathons",
        "challenges",
        "competitions",
        "items",
        "results",
        "data",
        "events",
    ])
}
fn default_title_fields() -> Vec<String> {
    to_strings(&["title", "name", "headline"])
}
fn default_link_fields() -> Vec<String> {
    to_strings(&["url", "link", "href", "permalink", "external_url"])
}
fn default_deadline_fields() -> Vec<String> {
    to_strings(&[
        "deadline",
        "submission_deadline",
        "end_date",
        "ends_at",
        "deadline_at",
        "submission_period_dates",
    ])
}
fn default_feed_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

fn to_strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// One source, described as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub primary: Endpoint,
    #[serde(default)]
    pub fallback: Option<Endpoint>,
    /// Titles must contain one of these (case-insensitive). Empty accepts all.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub title_attr: Option<String>,
    #[serde(default = "default_list_keys")]
    pub list_keys: Vec<String>,
    #[serde(default = "default_title_fields")]
    pub title_fields: Vec<String>,
    #[serde(default = "default_link_fields")]
    pub link_fields: Vec<String>,
    #[serde(default = "default_deadline_fields")]
    pub deadline_fields: Vec<String>,
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

impl SourceDescriptor {
    pub fn new(name: &str, primary: Endpoint) -> Self {
        Self {
            name: name.to_string(),
            primary,
            fallback: None,
            keywords: Vec::new(),
            selectors: default_selectors(),
            title_attr: None,
            list_keys: default_list_keys(),
            title_fields: default_title_fields(),
            link_fields: default_link_fields(),
            deadline_fields: default_deadline_fields(),
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }

    pub fn fallback(mut self, ep: Endpoint) -> Self {
        self.fallback = Some(ep);
        self
    }

    pub fn keywords(mut self, kws: &[&str]) -> Self {
        self.keywords = to_strings(kws);
        self
    }

    pub fn selectors(mut self, sels: &[&str]) -> Self {
        self.selectors = to_strings(sels);
        self
    }

    pub fn title_attr(mut self, attr: &str) -> Self {
        self.title_attr = Some(attr.to_string());
        self
    }

    fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        std::iter::once(&self.primary).chain(self.fallback.iter())
    }
}

/// Generic executor: primary endpoint first, fallback only when it yields nothing.
pub struct DescriptorAdapter {
    descriptor: SourceDescriptor,
    fetcher: Arc<dyn Fetch>,
}

impl DescriptorAdapter {
    pub fn new(descriptor: SourceDescriptor, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            descriptor,
            fetcher,
        }
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn run_endpoint(&self, ep: &Endpoint) -> Vec<Item> {
        let d = &self.descriptor;
        let fetcher = self.fetcher.as_ref();
        match ep.kind {
            EndpointKind::Rss => parse_feed(fetcher, &ep.url, d.feed_limit)
                .await
                .into_iter()
                .filter(|it| crate::ingest::matches_keywords(&it.title, &d.keywords))
                .collect(),
            EndpointKind::Json => {
                let fields = JsonFields {
                    list_keys: &d.list_keys,
                    title: &d.title_fields,
                    link: &d.link_fields,
                    deadline: &d.deadline_fields,
                    keywords: &d.keywords,
                };
                fetch_listing(fetcher, &ep.url, fields).await
            }
            EndpointKind::Html => {
                let scan = HtmlScan {
                    selectors: &d.selectors,
                    keywords: &d.keywords,
                    title_attr: d.title_attr.as_deref(),
                };
                scan_page(fetcher, &ep.url, scan).await
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for DescriptorAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        for ep in self.descriptor.endpoints() {
            let items = self.run_endpoint(ep).await;
            tracing::debug!(
                target: "ingest",
                source = %self.descriptor.name,
                kind = ?ep.kind,
                url = %ep.url,
                count = items.len(),
                "endpoint tried"
            );
            if !items.is_empty() {
                return Ok(dedupe(items));
            }
        }
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Ordered set of adapters the aggregator runs.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: Vec<SourceDescriptor>, fetcher: Arc<dyn Fetch>) -> Self {
        let adapters = descriptors
            .into_iter()
            .map(|d| Box::new(DescriptorAdapter::new(d, fetcher.clone())) as Box<dyn SourceAdapter>)
            .collect();
        Self { adapters }
    }

    pub fn with_adapter(mut self, adapter: impl SourceAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    pub fn adapters(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Built-in registry, in digest order.
pub fn default_descriptors() -> Vec<SourceDescriptor> {
    vec![
        // Government
        SourceDescriptor::new("mygov", Endpoint::html("https://www.mygov.in/homepage/"))
            .keywords(&["challenge", "hackathon"]),
        SourceDescriptor::new("meity", Endpoint::html("https://www.meity.gov.in/press-releases"))
            .keywords(&["challenge", "hackathon", "innovation"]),
        SourceDescriptor::new("digital_india", Endpoint::html("https://www.digitalindia.gov.in/news"))
            .keywords(&["hackathon"]),
        SourceDescriptor::new("rbi", Endpoint::rss("https://www.rbi.org.in/pressreleases_rss.xml"))
            .fallback(Endpoint::html(
                "https://www.rbi.org.in/Scripts/BS_PressReleaseDisplay.aspx",
            ))
            .keywords(&["harbinger", "hackathon"]),
        SourceDescriptor::new("isro", Endpoint::html("https://www.isro.gov.in/Updates.html"))
            .keywords(&["hackathon", "challenge"]),
        SourceDescriptor::new("nic", Endpoint::html("https://www.nic.in/news/"))
            .selectors(&["h2", "h3"])
            .keywords(&["challenge", "hackathon"]),
        // Corporate / tech
        SourceDescriptor::new("nvidia", Endpoint::rss("https://developer.nvidia.com/blog/feed/"))
            .fallback(Endpoint::html("https://developer.nvidia.com/community/events"))
            .selectors(&["h3", "h2"])
            .keywords(&["challenge", "hackathon"]),
        SourceDescriptor::new("meta", Endpoint::html("https://developers.facebook.com/blog/"))
            .selectors(&["h2"])
            .keywords(&["challenge", "hackathon"]),
        SourceDescriptor::new(
            "google_dev",
            Endpoint::rss("https://developers.googleblog.com/feeds/posts/default"),
        )
        .fallback(Endpoint::html("https://developers.google.com/events"))
        .keywords(&["challenge", "hackathon"]),
        SourceDescriptor::new(
            "microsoft",
            Endpoint::html("https://developer.microsoft.com/en-us/events/"),
        )
        .selectors(&["h3", "h2"])
        .keywords(&["challenge", "hackathon"]),
        SourceDescriptor::new("apple", Endpoint::rss("https://developer.apple.com/news/rss/news.rss"))
            .fallback(Endpoint::html("https://developer.apple.com/news/"))
            .selectors(&["h2", "h3"])
            .keywords(&["challenge"]),
        SourceDescriptor::new("aws", Endpoint::html("https://aws.amazon.com/events/"))
            .selectors(&["h2", "h3"])
            .keywords(&["challenge", "hackathon"]),
        // Competition platforms
        SourceDescriptor::new("kaggle", Endpoint::html("https://www.kaggle.com/competitions"))
            .selectors(&["a[href^=\"/competitions/\"]"]),
        SourceDescriptor::new("aicrowd", Endpoint::html("https://www.aicrowd.com/challenges"))
            .selectors(&["a.challenge-list-item__link"])
            .title_attr("title"),
        SourceDescriptor::new("devfolio", Endpoint::html("https://devfolio.co/hackathons"))
            .selectors(&["h3"])
            .keywords(&["hackathon"]),
        SourceDescriptor::new(
            "devpost",
            Endpoint::json("https://devpost.com/api/hackathons?status[]=upcoming&status[]=open"),
        )
        .fallback(Endpoint::html("https://devpost.com/hackathons"))
        .selectors(&["h3", "a"])
        .keywords(&["hack", "challenge"]),
        // News search
        SourceDescriptor::new(
            "google_news",
            Endpoint::rss("https://news.google.com/rss/search?q=hackathon&hl=en-IN&gl=IN&ceid=IN:en"),
        )
        .fallback(Endpoint::html(
            "https://news.google.com/search?q=hackathon&hl=en-IN&gl=IN&ceid=IN:en",
        ))
        .selectors(&["h3"])
        .keywords(&["hackathon", "challenge"]),
    ]
}
