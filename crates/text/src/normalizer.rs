use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Tokens with fewer chars than this are dropped as noise
pub const MIN_TOKEN_CHARS: usize = 2;

/// Token → occurrence count, with a running total.
///
/// Backed by a `BTreeMap` so iteration order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMultiset {
    counts: BTreeMap<String, u32>,
    total: usize,
}

impl TokenMultiset {
    /// Create an empty multiset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a multiset from already-normalized tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for token in tokens {
            set.insert(token.into());
        }
        set
    }

    fn insert(&mut self, token: String) {
        *self.counts.entry(token).or_insert(0) += 1;
        self.total += 1;
    }

    /// Add every occurrence from `other`
    pub fn merge(&mut self, other: &Self) {
        for (token, count) in &other.counts {
            *self.counts.entry(token.clone()).or_insert(0) += count;
        }
        self.total += other.total;
    }

    /// Occurrences of `token`
    #[must_use]
    pub fn count(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Total number of tokens, counting repeats
    #[must_use]
    pub const fn total_tokens(&self) -> usize {
        self.total
    }

    /// Number of distinct tokens
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    /// Sum over shared tokens of `min(self[t], other[t])`
    #[must_use]
    pub fn shared_weight(&self, other: &Self) -> usize {
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .counts
            .iter()
            .map(|(token, &count)| count.min(large.count(token)) as usize)
            .sum()
    }

    /// Iterate tokens in lexical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(token, &count)| (token.as_str(), count))
    }
}

/// Tokenize `text` into a multiset. Never fails; symbol-only input is empty.
#[must_use]
pub fn normalize(text: &str) -> TokenMultiset {
    TokenMultiset::from_tokens(tokenize(text))
}

/// Tokenize `text`, preserving order and repeats
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold_text(text);
    let mut tokens = Vec::new();
    for word in folded.unicode_words() {
        split_word(word, &mut tokens);
    }
    tokens
}

/// Lowercase, decompose and strip Latin combining diacritics.
///
/// Devanagari vowel signs, virama and nukta are not in the stripped range, so
/// Devanagari text survives folding (in decomposed form).
#[must_use]
pub fn fold_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_latin_combining_mark(*c))
        .collect()
}

/// Is `ch` inside a Devanagari block (main, Extended, or Vedic Extensions)?
#[must_use]
pub const fn is_devanagari(ch: char) -> bool {
    matches!(ch, '\u{0900}'..='\u{097F}' | '\u{A8E0}'..='\u{A8FF}' | '\u{1CD0}'..='\u{1CFF}')
}

/// Does `text` contain any Devanagari code point?
#[must_use]
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Script {
    Devanagari,
    Other,
}

impl Script {
    fn of(ch: char) -> Option<Self> {
        if is_danda(ch) {
            None
        } else if is_devanagari(ch) {
            Some(Self::Devanagari)
        } else if ch.is_alphanumeric() {
            Some(Self::Other)
        } else {
            None
        }
    }
}

fn split_word(word: &str, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_script = None;

    for ch in word.chars() {
        // Joiners shape conjuncts; they are not separators.
        if matches!(ch, '\u{200C}' | '\u{200D}') {
            continue;
        }
        match Script::of(ch) {
            Some(script) => {
                if current_script.is_some_and(|s| s != script) {
                    flush(&mut current, out);
                }
                current.push(ch);
                current_script = Some(script);
            }
            None => {
                flush(&mut current, out);
                current_script = None;
            }
        }
    }
    flush(&mut current, out);
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    if current.chars().count() >= MIN_TOKEN_CHARS {
        out.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

const fn is_danda(ch: char) -> bool {
    matches!(ch, '\u{0964}' | '\u{0965}')
}

const fn is_latin_combining_mark(ch: char) -> bool {
    matches!(ch, '\u{0300}'..='\u{036F}')
}
