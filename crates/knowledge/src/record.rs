use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unvalidated corpus record as produced by an external loader.
///
/// Every field is optional so a single malformed record can be reported and
/// skipped instead of failing the whole corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: Option<String>,

    pub title: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    /// Longer text; only contributes to lexical matching
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Issuing authority or dataset name
    #[serde(default)]
    pub source: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD` date
    #[serde(default, alias = "updated")]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

impl EntryRecord {
    /// Create a record with id and title set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Builder: set summary
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder: set body
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder: add tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder: add language code
    #[must_use]
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.languages.push(code.into());
        self
    }

    /// Builder: set region
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder: set source attribution
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builder: set last-updated from a string (RFC 3339 or `YYYY-MM-DD`)
    #[must_use]
    pub fn last_updated(mut self, value: impl Into<String>) -> Self {
        self.last_updated = Some(value.into());
        self
    }

    /// Builder: set last-updated from a timestamp
    #[must_use]
    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at.to_rfc3339());
        self
    }

    /// Builder: set url
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
