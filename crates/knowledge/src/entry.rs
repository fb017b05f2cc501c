use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use kisan_text::{normalize, LanguageCode, TokenMultiset};

use crate::error::{KnowledgeError, Result};
use crate::record::EntryRecord;

/// A validated, immutable corpus entry.
///
/// Tags and languages are stored lowercase; the token multiset of
/// title + summary + body is computed once here.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    id: String,
    title: String,
    summary: String,
    body: Option<String>,
    tags: BTreeSet<String>,
    languages: BTreeSet<LanguageCode>,
    region: Option<String>,
    region_key: Option<String>,
    source: String,
    last_updated: DateTime<Utc>,
    url: Option<String>,
    tokens: TokenMultiset,
}

impl KnowledgeEntry {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    #[must_use]
    pub const fn languages(&self) -> &BTreeSet<LanguageCode> {
        &self.languages
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Case-insensitive comparison against a caller-supplied region hint
    #[must_use]
    pub fn region_matches(&self, hint: &str) -> bool {
        let hint = region_key(hint);
        !hint.is_empty() && self.region_key.as_deref() == Some(hint.as_str())
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Tokens of title + summary + body
    #[must_use]
    pub const fn tokens(&self) -> &TokenMultiset {
        &self.tokens
    }
}

impl TryFrom<EntryRecord> for KnowledgeEntry {
    type Error = KnowledgeError;

    fn try_from(record: EntryRecord) -> Result<Self> {
        let id = non_blank(record.id).ok_or_else(|| KnowledgeError::missing("<unknown>", "id"))?;
        let title = non_blank(record.title).ok_or_else(|| KnowledgeError::missing(&id, "title"))?;
        let source =
            non_blank(record.source).ok_or_else(|| KnowledgeError::missing(&id, "source"))?;
        let raw_updated = non_blank(record.last_updated)
            .ok_or_else(|| KnowledgeError::missing(&id, "last_updated"))?;
        let last_updated =
            parse_timestamp(&raw_updated).ok_or_else(|| KnowledgeError::InvalidTimestamp {
                id: id.clone(),
                value: raw_updated.clone(),
            })?;

        let mut languages = BTreeSet::new();
        for code in record.languages {
            if code.trim().is_empty() {
                continue;
            }
            let parsed = LanguageCode::new(&code).ok_or_else(|| KnowledgeError::InvalidLanguage {
                id: id.clone(),
                code: code.clone(),
            })?;
            languages.insert(parsed);
        }
        if languages.is_empty() {
            return Err(KnowledgeError::EmptyLanguages(id));
        }

        let tags = record
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        let summary = record.summary.map(|s| s.trim().to_string()).unwrap_or_default();
        let body = non_blank(record.body);
        let region = non_blank(record.region);
        let region_key = region.as_deref().map(region_key);

        let mut tokens = normalize(&title);
        tokens.merge(&normalize(&summary));
        if let Some(body) = &body {
            tokens.merge(&normalize(body));
        }

        Ok(Self {
            id,
            title,
            summary,
            body,
            tags,
            languages,
            region,
            region_key,
            source,
            last_updated,
            url: non_blank(record.url),
            tokens,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn region_key(region: &str) -> String {
    region.trim().to_lowercase()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> EntryRecord {
        EntryRecord::new("pm-kisan", "PM-KISAN income support")
            .summary("Rs 6000 per year to landholding farmer families.")
            .body("Paid in three instalments via DBT.")
            .tag(" Scheme ")
            .tag("INCOME")
            .language("EN")
            .language("hi")
            .region(" Maharashtra ")
            .source("Ministry of Agriculture")
            .last_updated("2024-02-01")
    }

    #[test]
    fn normalizes_tags_languages_and_region() {
        let entry = KnowledgeEntry::try_from(record()).unwrap();
        let tags: Vec<&str> = entry.tags().iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["income", "scheme"]);
        assert!(entry.languages().contains(&LanguageCode::ENGLISH));
        assert!(entry.languages().contains(&LanguageCode::HINDI));
        assert_eq!(entry.region(), Some("Maharashtra"));
        assert!(entry.region_matches("MAHARASHTRA"));
        assert!(!entry.region_matches("Punjab"));
        assert!(!entry.region_matches("  "));
    }

    #[test]
    fn tokenizes_title_summary_and_body() {
        let entry = KnowledgeEntry::try_from(record()).unwrap();
        assert_eq!(entry.tokens().count("kisan"), 1);
        assert_eq!(entry.tokens().count("farmer"), 1);
        assert_eq!(entry.tokens().count("instalments"), 1);
    }

    #[test]
    fn parses_date_only_and_rfc3339_timestamps() {
        let entry = KnowledgeEntry::try_from(record()).unwrap();
        assert_eq!(entry.last_updated().to_rfc3339(), "2024-02-01T00:00:00+00:00");

        let entry =
            KnowledgeEntry::try_from(record().last_updated("2024-02-01T10:30:00+05:30")).unwrap();
        assert_eq!(entry.last_updated().to_rfc3339(), "2024-02-01T05:00:00+00:00");
    }

    #[test]
    fn rejects_missing_required_fields() {
        let mut no_id = record();
        no_id.id = Some("   ".to_string());
        assert_eq!(
            KnowledgeEntry::try_from(no_id).unwrap_err(),
            KnowledgeError::missing("<unknown>", "id")
        );

        let mut no_source = record();
        no_source.source = None;
        assert_eq!(
            KnowledgeEntry::try_from(no_source).unwrap_err(),
            KnowledgeError::missing("pm-kisan", "source")
        );
    }

    #[test]
    fn rejects_empty_or_invalid_languages() {
        let mut empty = record();
        empty.languages = vec![" ".to_string()];
        assert_eq!(
            KnowledgeEntry::try_from(empty).unwrap_err(),
            KnowledgeError::EmptyLanguages("pm-kisan".to_string())
        );

        let err = KnowledgeEntry::try_from(record().language("hindi!")).unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidLanguage { .. }));
    }

    #[test]
    fn rejects_bad_timestamps() {
        let err = KnowledgeEntry::try_from(record().last_updated("last monsoon")).unwrap_err();
        assert_eq!(err.entry_id(), "pm-kisan");
        assert!(matches!(err, KnowledgeError::InvalidTimestamp { .. }));
    }
}
