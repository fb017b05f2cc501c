//! # Kisan Retrieval
//!
//! Selects and ranks the curated advisory entries that ground a generated
//! answer to a farmer's question.
//!
//! ## Pipeline
//!
//! ```text
//! question + RetrievalOptions
//!     │
//!     ├──> QueryContext (tokens, tags, region, languages, as_of)
//!     │    └─> language detected from the question when no preference is given
//!     │        (scores only, never qualifies an entry)
//!     │
//!     ├──> ScoringEngine, one pass over the store snapshot (rayon for large corpora)
//!     │    ├─> lexical overlap   (cosine-like, token multisets)
//!     │    ├─> tag match         (fraction of query tags)
//!     │    ├─> region match      (case-insensitive)
//!     │    ├─> language          (1 - index / len of first preferred hit)
//!     │    └─> recency           (0.5 ^ (age / half-life))
//!     │
//!     ├──> Ranker: score desc, last_updated desc, id asc; truncate to limit
//!     │
//!     └──> ContextBuilder: numbered reference blocks
//! ```
//!
//! Each call is O(entries × query tokens). Entries carry their token multisets
//! precomputed, so the corpus is never re-tokenized at query time.
//!
//! ## Example
//!
//! ```rust
//! use kisan_knowledge::{EntryRecord, KnowledgeStore};
//! use kisan_retrieval::{build_context_text, retrieve_knowledge_context, RetrievalOptions};
//!
//! let store = KnowledgeStore::try_from_records(vec![
//!     EntryRecord::new("pmfby", "Pradhan Mantri Fasal Bima Yojana")
//!         .summary("Crop insurance against yield loss from natural calamities.")
//!         .tag("insurance")
//!         .language("en")
//!         .source("Ministry of Agriculture")
//!         .last_updated("2024-04-01"),
//! ])
//! .unwrap();
//!
//! let options = RetrievalOptions::new().tag("insurance");
//! let matches = retrieve_knowledge_context(&store, "How do I insure my crop?", &options);
//! assert_eq!(matches[0].id, "pmfby");
//! assert!(build_context_text(&matches).starts_with("[1] Pradhan Mantri Fasal Bima Yojana"));
//! ```

mod context;
mod error;
mod profile;
mod query;
mod ranker;
mod retriever;
mod scoring;

pub use context::{build_context_text, ContextBuilder, NO_REFERENCES};
pub use error::{Result, RetrievalError};
pub use profile::{
    ContextConfig, LanguageConfig, RecencyConfig, RetrievalProfile, ScoringWeights,
    SelectionConfig,
};
pub use query::{QueryContext, RetrievalOptions};
pub use ranker::{rank, Match};
pub use retriever::Retriever;
pub use scoring::{ScoredEntry, ScoringEngine, SignalScores};

use kisan_knowledge::KnowledgeStore;
use kisan_text::LanguageCode;
use once_cell::sync::Lazy;

static DEFAULT_RETRIEVER: Lazy<Retriever> = Lazy::new(Retriever::new);

/// Language of `text` according to the bundled hint lists
#[must_use]
pub fn detect_language_from_text(text: &str) -> LanguageCode {
    kisan_text::detect(text)
}

/// Rank `store` for `question` with the builtin profile
#[must_use]
pub fn retrieve_knowledge_context(
    store: &KnowledgeStore,
    question: &str,
    options: &RetrievalOptions,
) -> Vec<Match> {
    DEFAULT_RETRIEVER.retrieve(store, question, options)
}
