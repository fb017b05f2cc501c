//! # Kisan Text
//!
//! Text handling shared by the knowledge store and the retrieval engine.
//!
//! ## Pipeline
//!
//! ```text
//! Raw question / entry text
//!     │
//!     ├──> Fold (lowercase, NFD, drop Latin diacritics)
//!     │
//!     ├──> Word segmentation (UAX #29)
//!     │    ├─> split at punctuation and danda
//!     │    └─> split at Latin ↔ Devanagari boundaries
//!     │
//!     └──> TokenMultiset (token → count, tokens < 2 chars dropped)
//! ```
//!
//! Language detection is a separate, pure heuristic: Latin-only text is English,
//! Devanagari text is classified by ordered keyword lists loaded from a versioned
//! configuration document.
//!
//! ## Example
//!
//! ```rust
//! use kisan_text::{detect, normalize, LanguageCode};
//!
//! let tokens = normalize("Cotton pest: pink bollworm!");
//! assert_eq!(tokens.count("bollworm"), 1);
//!
//! assert_eq!(detect("How do I apply for PM-Kisan?"), LanguageCode::ENGLISH);
//! assert_eq!(detect("कापसावर कोणती फवारणी करावी आहे?"), LanguageCode::MARATHI);
//! ```

pub mod document;
mod error;
mod language;
mod normalizer;

pub use error::{Result, TextError};
pub use language::{detect, LanguageCode, LanguageHints};
pub use normalizer::{
    contains_devanagari, fold_text, is_devanagari, normalize, tokenize, TokenMultiset,
    MIN_TOKEN_CHARS,
};
