use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{ScoredEntry, SignalScores};

/// A ranked reference, detached from the store snapshot it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub score: f32,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    pub source: String,
    #[serde(rename = "updated")]
    pub last_updated: DateTime<Utc>,
    pub signals: SignalScores,
}

impl From<&ScoredEntry<'_>> for Match {
    fn from(scored: &ScoredEntry<'_>) -> Self {
        let entry = scored.entry;
        Self {
            id: entry.id().to_string(),
            score: scored.score,
            title: entry.title().to_string(),
            summary: entry.summary().to_string(),
            url: entry.url().map(str::to_string),
            source: entry.source().to_string(),
            last_updated: entry.last_updated(),
            signals: scored.signals,
        }
    }
}

/// Total order: score desc, then last_updated desc, then id asc
fn compare(a: &ScoredEntry<'_>, b: &ScoredEntry<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.entry.last_updated().cmp(&a.entry.last_updated()))
        .then_with(|| a.entry.id().cmp(b.entry.id()))
}

/// Order `scored` and keep the first `limit`
#[must_use]
pub fn rank(mut scored: Vec<ScoredEntry<'_>>, limit: usize) -> Vec<Match> {
    if limit == 0 {
        return Vec::new();
    }
    scored.sort_by(compare);
    scored.iter().take(limit).map(Match::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kisan_knowledge::{EntryRecord, KnowledgeEntry};
    use pretty_assertions::assert_eq;

    fn entry(id: &str, updated: &str) -> KnowledgeEntry {
        KnowledgeEntry::try_from(
            EntryRecord::new(id, format!("Entry {id}"))
                .summary("Soil health card")
                .language("en")
                .source("Soil Health Card portal")
                .last_updated(updated)
                .url(format!("https://example.org/{id}")),
        )
        .unwrap()
    }

    fn scored(entry: &KnowledgeEntry, score: f32) -> ScoredEntry<'_> {
        ScoredEntry {
            entry,
            score,
            signals: SignalScores::default(),
        }
    }

    #[test]
    fn breaks_ties_by_recency_then_id() {
        let old_b = entry("b", "2023-01-01");
        let new_c = entry("c", "2024-01-01");
        let old_a = entry("a", "2023-01-01");
        let top = entry("z", "2020-01-01");

        let ranked = rank(
            vec![
                scored(&old_b, 0.5),
                scored(&new_c, 0.5),
                scored(&old_a, 0.5),
                scored(&top, 0.9),
            ],
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "c", "a", "b"]);
    }

    #[test]
    fn truncates_without_padding() {
        let a = entry("a", "2024-01-01");
        let b = entry("b", "2024-01-01");
        assert_eq!(rank(vec![scored(&a, 0.2), scored(&b, 0.4)], 1).len(), 1);
        assert_eq!(rank(vec![scored(&a, 0.2)], 4).len(), 1);
        assert!(rank(vec![scored(&a, 0.2)], 0).is_empty());
    }

    #[test]
    fn serializes_last_updated_as_updated() {
        let a = entry("a", "2024-03-05");
        let ranked = rank(vec![scored(&a, 0.25)], 1);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["updated"], "2024-03-05T00:00:00Z");
        assert_eq!(json["url"], "https://example.org/a");
        assert!(json.get("last_updated").is_none());
        assert_eq!(json["signals"]["tag"], 0.0);
    }
}
