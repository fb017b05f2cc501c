use kisan_knowledge::{KnowledgeEntry, KnowledgeStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::profile::RetrievalProfile;
use crate::query::QueryContext;

/// Corpora smaller than this are scored on the calling thread
const PARALLEL_THRESHOLD: usize = 256;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-signal breakdown of a score, each component in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    pub lexical: f32,
    pub tag: f32,
    pub region: f32,
    pub language: f32,
    pub recency: f32,
}

impl SignalScores {
    /// Lexical, tag or region evidence
    #[must_use]
    pub fn has_topical_signal(&self) -> bool {
        self.lexical > 0.0 || self.tag > 0.0 || self.region > 0.0
    }
}

/// An entry that passed the inclusion policy, not yet ordered
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: f32,
    pub signals: SignalScores,
}

/// Weighted multi-signal scorer bound to one profile
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'p> {
    profile: &'p RetrievalProfile,
}

impl<'p> ScoringEngine<'p> {
    #[must_use]
    pub const fn new(profile: &'p RetrievalProfile) -> Self {
        Self { profile }
    }

    /// Individual signal values for `entry`
    #[must_use]
    pub fn signals(&self, entry: &KnowledgeEntry, query: &QueryContext) -> SignalScores {
        SignalScores {
            lexical: lexical_overlap(entry, query),
            tag: tag_match(entry, query),
            region: region_match(entry, query),
            language: language_preference(entry, query),
            recency: recency(entry, query, self.profile.recency().half_life_days),
        }
    }

    /// Weighted sum of `signals`, clamped to [0, 1]
    #[must_use]
    pub fn combine(&self, signals: &SignalScores) -> f32 {
        let w = self.profile.weights();
        let total = w.lexical * signals.lexical
            + w.tag * signals.tag
            + w.region * signals.region
            + w.language * signals.language
            + w.recency * signals.recency;
        total.clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn score(&self, entry: &KnowledgeEntry, query: &QueryContext) -> f32 {
        self.combine(&self.signals(entry, query))
    }

    /// Score one entry, returning `None` when the inclusion policy rejects it
    #[must_use]
    pub fn evaluate<'e>(
        &self,
        entry: &'e KnowledgeEntry,
        query: &QueryContext,
    ) -> Option<ScoredEntry<'e>> {
        let signals = self.signals(entry, query);
        let selection = self.profile.selection();

        // Recency never qualifies an entry, and neither does a detected language
        let language_qualifies = signals.language > 0.0
            && !selection.require_topical_signal
            && !query.language_is_detected();
        let qualifies = signals.has_topical_signal() || language_qualifies;
        if !qualifies {
            return None;
        }

        let score = self.combine(&signals);
        (score > selection.min_score).then_some(ScoredEntry {
            entry,
            score,
            signals,
        })
    }

    /// Evaluate every entry of `store`; the result order is unspecified
    #[must_use]
    pub fn evaluate_all<'s>(
        &self,
        store: &'s KnowledgeStore,
        query: &QueryContext,
    ) -> Vec<ScoredEntry<'s>> {
        let entries = store.entries();
        if entries.len() < PARALLEL_THRESHOLD {
            entries
                .iter()
                .filter_map(|entry| self.evaluate(entry, query))
                .collect()
        } else {
            entries
                .par_iter()
                .filter_map(|entry| self.evaluate(entry, query))
                .collect()
        }
    }
}

fn lexical_overlap(entry: &KnowledgeEntry, query: &QueryContext) -> f32 {
    let q = query.tokens();
    let e = entry.tokens();
    if q.is_empty() || e.is_empty() {
        return 0.0;
    }
    let shared = q.shared_weight(e) as f64;
    let norm = (q.total_tokens() as f64 * e.total_tokens() as f64).sqrt();
    (shared / norm).min(1.0) as f32
}

fn tag_match(entry: &KnowledgeEntry, query: &QueryContext) -> f32 {
    let tags = query.tags();
    if tags.is_empty() {
        return 0.0;
    }
    let hits = tags.iter().filter(|tag| entry.tags().contains(*tag)).count();
    hits as f32 / tags.len() as f32
}

fn region_match(entry: &KnowledgeEntry, query: &QueryContext) -> f32 {
    match query.region_hint() {
        Some(hint) if entry.region_matches(hint) => 1.0,
        _ => 0.0,
    }
}

fn language_preference(entry: &KnowledgeEntry, query: &QueryContext) -> f32 {
    let preferred = query.preferred_languages();
    preferred
        .iter()
        .position(|code| entry.languages().iter().any(|lang| lang.as_str() == code))
        .map_or(0.0, |idx| 1.0 - idx as f32 / preferred.len() as f32)
}

fn recency(entry: &KnowledgeEntry, query: &QueryContext, half_life_days: f64) -> f32 {
    if half_life_days <= 0.0 {
        return 0.0;
    }
    let age_secs = (query.as_of() - entry.last_updated()).num_seconds().max(0);
    let age_days = age_secs as f64 / SECONDS_PER_DAY;
    0.5f64.powf(age_days / half_life_days) as f32
}
