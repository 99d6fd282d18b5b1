// src/ingest/types.rs
use anyhow::Result;
use indexmap::IndexMap;

/// One discovered announcement.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    #[serde(default)]
    pub url: String, // absolute, or "" when nothing usable was found
    #[serde(default)]
    pub deadline: Option<String>, // ISO date when parsed, raw text otherwise
}

impl Item {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<String>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<T: Into<String>, U: Into<String>> From<(T, U)> for Item {
    fn from((title, url): (T, U)) -> Self {
        Item::new(title, url)
    }
}

/// Source id -> items, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResultSet(IndexMap<String, Vec<Item>>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, items: Vec<Item>) {
        self.0.insert(source.into(), items);
    }

    pub fn get(&self, source: &str) -> Option<&[Item]> {
        self.0.get(source).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Rebuild the set source by source, keeping source order.
    pub fn map_items<F>(self, mut f: F) -> ResultSet
    where
        F: FnMut(&str, Vec<Item>) -> Vec<Item>,
    {
        let inner = self
            .0
            .into_iter()
            .map(|(source, items)| {
                let kept = f(&source, items);
                (source, kept)
            })
            .collect();
        ResultSet(inner)
    }

    /// Pretty JSON, stable source order, non-ASCII left as is.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<(String, Vec<Item>)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Item>)>>(iter: I) -> Self {
        ResultSet(iter.into_iter().collect())
    }
}

/// A single source. Stateless between calls; failures stay inside the returned `Result`.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Item>>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_source_order_and_null_deadline() {
        let mut rs = ResultSet::new();
        rs.insert("zeta", vec![Item::new("Hack Z", "https://z/1")]);
        rs.insert("alpha", vec![]);
        let json = rs.to_json_pretty().unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
        assert!(json.contains("\"deadline\": null"));
    }

    #[test]
    fn missing_url_defaults_to_empty() {
        let it: Item = serde_json::from_str(r#"{"title":"Hack"}"#).unwrap();
        assert_eq!(it.url, "");
        assert_eq!(it.deadline, None);
    }
}
