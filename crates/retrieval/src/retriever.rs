use std::borrow::Cow;

use kisan_knowledge::{KnowledgeStore, StoreHandle};
use kisan_text::{LanguageCode, LanguageHints};

use crate::context::ContextBuilder;
use crate::profile::RetrievalProfile;
use crate::query::{QueryContext, RetrievalOptions};
use crate::ranker::{rank, Match};
use crate::scoring::ScoringEngine;

/// Retrieval pipeline bound to a profile and a set of language hints.
///
/// Holds only immutable configuration; the corpus is passed into every call,
/// so one retriever can serve any number of threads and store snapshots.
#[derive(Debug, Clone)]
pub struct Retriever {
    profile: RetrievalProfile,
    hints: Cow<'static, LanguageHints>,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new()
    }
}

impl Retriever {
    /// Builtin profile and builtin language hints
    #[must_use]
    pub fn new() -> Self {
        Self::with_profile(RetrievalProfile::builtin())
    }

    #[must_use]
    pub fn with_profile(profile: RetrievalProfile) -> Self {
        Self {
            profile,
            hints: Cow::Borrowed(LanguageHints::builtin()),
        }
    }

    /// Replace the language hint lists used for detection
    #[must_use]
    pub fn with_hints(mut self, hints: LanguageHints) -> Self {
        self.hints = Cow::Owned(hints);
        self
    }

    #[must_use]
    pub const fn profile(&self) -> &RetrievalProfile {
        &self.profile
    }

    #[must_use]
    pub fn hints(&self) -> &LanguageHints {
        &self.hints
    }

    /// Rank the entries of `store` for `question`
    #[must_use]
    pub fn retrieve(
        &self,
        store: &KnowledgeStore,
        question: &str,
        options: &RetrievalOptions,
    ) -> Vec<Match> {
        let limit = self.profile.effective_limit(options.limit);
        if limit == 0 || store.is_empty() {
            log::debug!("Retrieve skipped: limit={limit}, entries={}", store.len());
            return Vec::new();
        }

        let query = match self.detected_language(question, options) {
            Some(code) => QueryContext::with_detected_language(question, options, &code),
            None => QueryContext::new(question, options),
        };
        let engine = ScoringEngine::new(&self.profile);
        let scored = engine.evaluate_all(store, &query);
        log::debug!(
            "Retrieve: {} query tokens, {}/{} entries qualified, limit={limit}",
            query.tokens().total_tokens(),
            scored.len(),
            store.len()
        );

        rank(scored, limit)
    }

    /// Rank and render in one call; both outputs come from the same list
    #[must_use]
    pub fn retrieve_with_context(
        &self,
        store: &KnowledgeStore,
        question: &str,
        options: &RetrievalOptions,
    ) -> (Vec<Match>, String) {
        let matches = self.retrieve(store, question, options);
        let context = self.context_builder().build(&matches);
        (matches, context)
    }

    /// Retrieve against the snapshot current at call time
    #[must_use]
    pub fn retrieve_current(
        &self,
        handle: &StoreHandle,
        question: &str,
        options: &RetrievalOptions,
    ) -> Vec<Match> {
        let snapshot = handle.snapshot();
        self.retrieve(&snapshot, question, options)
    }

    /// Context builder configured from the profile
    #[must_use]
    pub fn context_builder(&self) -> ContextBuilder {
        ContextBuilder::new().with_max_summary_chars(self.profile.context().max_summary_chars)
    }

    /// Language of `question` when the caller gave no preference and the
    /// profile allows detection
    fn detected_language(
        &self,
        question: &str,
        options: &RetrievalOptions,
    ) -> Option<LanguageCode> {
        let explicit = options
            .preferred_languages
            .iter()
            .any(|code| !code.trim().is_empty());
        if explicit || !self.profile.language().detect_when_unspecified {
            return None;
        }

        let detected = self.hints.detect(question);
        log::debug!("No language preference given, detected '{detected}'");
        Some(detected)
    }
}
