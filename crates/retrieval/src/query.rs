use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kisan_text::{normalize, LanguageCode, TokenMultiset};
use serde::{Deserialize, Serialize};

/// Per-call retrieval options.
///
/// Every field is optional; unknown regions, languages and tags are inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalOptions {
    /// Maximum number of matches; the profile default when absent
    pub limit: Option<usize>,
    pub region_hint: Option<String>,
    /// Most preferred first
    pub preferred_languages: Vec<String>,
    pub tags: Vec<String>,
    /// Reference time for recency; the current time when absent
    pub as_of: Option<DateTime<Utc>>,
}

impl RetrievalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region_hint = Some(region.into());
        self
    }

    #[must_use]
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.preferred_languages.push(code.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// A question normalized once and shared by every entry evaluation
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub(crate) tokens: TokenMultiset,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) region_key: Option<String>,
    pub(crate) preferred_languages: Vec<String>,
    pub(crate) language_detected: bool,
    pub(crate) as_of: DateTime<Utc>,
}

impl QueryContext {
    /// Normalize `question` and the option hints, using the caller's
    /// language preference as given
    pub fn new(question: &str, options: &RetrievalOptions) -> Self {
        Self::build(question, options, options.preferred_languages.clone(), false)
    }

    /// Like [`QueryContext::new`], with `detected` as the only preference.
    ///
    /// A detected language only adjusts scores; it never qualifies an entry
    /// on its own.
    pub fn with_detected_language(
        question: &str,
        options: &RetrievalOptions,
        detected: &LanguageCode,
    ) -> Self {
        Self::build(question, options, vec![detected.to_string()], true)
    }

    fn build(
        question: &str,
        options: &RetrievalOptions,
        preferred_languages: Vec<String>,
        language_detected: bool,
    ) -> Self {
        let tags = options
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        let region_key = options
            .region_hint
            .as_deref()
            .map(|region| region.trim().to_lowercase())
            .filter(|region| !region.is_empty());

        let mut seen = BTreeSet::new();
        let preferred_languages = preferred_languages
            .into_iter()
            .map(|code| code.trim().to_lowercase())
            .filter(|code| !code.is_empty() && seen.insert(code.clone()))
            .collect();

        Self {
            tokens: normalize(question),
            tags,
            region_key,
            preferred_languages,
            language_detected,
            as_of: options.as_of.unwrap_or_else(Utc::now),
        }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenMultiset {
        &self.tokens
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    #[must_use]
    pub fn region_hint(&self) -> Option<&str> {
        self.region_key.as_deref()
    }

    #[must_use]
    pub fn preferred_languages(&self) -> &[String] {
        &self.preferred_languages
    }

    /// Preference came from detection rather than the caller
    #[must_use]
    pub const fn language_is_detected(&self) -> bool {
        self.language_detected
    }

    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_hints() {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let options = RetrievalOptions::new()
            .tag(" Cotton ")
            .tag("cotton")
            .tag("")
            .region("  ")
            .language("MR")
            .language("mr")
            .language(" hi ")
            .language("")
            .as_of(as_of);
        let ctx = QueryContext::new("Pink bollworm in cotton", &options);

        assert_eq!(ctx.tags().iter().collect::<Vec<_>>(), vec!["cotton"]);
        assert_eq!(ctx.region_hint(), None);
        assert_eq!(ctx.preferred_languages(), ["mr", "hi"]);
        assert_eq!(ctx.as_of(), as_of);
        assert_eq!(ctx.tokens().count("cotton"), 1);
        assert!(!ctx.language_is_detected());
    }

    #[test]
    fn detected_language_replaces_empty_preference() {
        let ctx = QueryContext::with_detected_language(
            "कांदा साठवणूक",
            &RetrievalOptions::new(),
            &LanguageCode::MARATHI,
        );
        assert_eq!(ctx.preferred_languages(), ["mr"]);
        assert!(ctx.language_is_detected());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: RetrievalOptions =
            serde_json::from_str(r#"{"limit": 2, "tags": ["soil"]}"#).unwrap();
        assert_eq!(options.limit, Some(2));
        assert_eq!(options.tags, vec!["soil"]);
        assert!(options.preferred_languages.is_empty());
        assert!(options.as_of.is_none());
    }
}
