use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::document::{self, Shape};
use crate::error::TextError;
use crate::normalizer::{contains_devanagari, tokenize};

const BUILTIN_HINTS: &str = include_str!("../../../profiles/languages.json");

const HINT_LIST_SHAPE: Shape =
    Shape::Object(&[("language", Shape::Leaf), ("keywords", Shape::Leaf)]);
const HINTS_SHAPE: Shape = Shape::Object(&[
    ("schema_version", Shape::Leaf),
    ("revision", Shape::Leaf),
    ("default_latin", Shape::Leaf),
    ("default_devanagari", Shape::Leaf),
    ("hints", Shape::Array(&HINT_LIST_SHAPE)),
]);

static BUILTIN: Lazy<LanguageHints> = Lazy::new(|| {
    LanguageHints::from_bytes(BUILTIN_HINTS.as_bytes()).unwrap_or_else(|err| {
        log::error!("Bundled language hints are invalid: {err:#}");
        LanguageHints::fallback()
    })
});

/// Lowercase language code such as `en`, `hi` or `mr`.
///
/// The set is open: configuration may introduce further codes without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(Cow<'static, str>);

impl LanguageCode {
    pub const ENGLISH: Self = Self(Cow::Borrowed("en"));
    pub const HINDI: Self = Self(Cow::Borrowed("hi"));
    pub const MARATHI: Self = Self(Cow::Borrowed("mr"));

    /// Parse a code, trimming and lowercasing it. `None` if empty or malformed.
    #[must_use]
    pub fn new(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        let valid = !code.is_empty()
            && code.len() <= 16
            && code
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        valid.then(|| match code.as_str() {
            "en" => Self::ENGLISH,
            "hi" => Self::HINDI,
            "mr" => Self::MARATHI,
            _ => Self(Cow::Owned(code)),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = TextError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| TextError::invalid_language_code(s))
    }
}

impl Serialize for LanguageCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered keyword lists used to tell Devanagari-script languages apart.
///
/// Lists are checked in order; the first list with a keyword among the text's
/// tokens wins. Devanagari text with no hit falls back to `default_devanagari`.
#[derive(Debug, Clone)]
pub struct LanguageHints {
    revision: Option<String>,
    default_latin: LanguageCode,
    default_devanagari: LanguageCode,
    lists: Vec<HintList>,
}

#[derive(Debug, Clone)]
struct HintList {
    language: LanguageCode,
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawHints {
    revision: Option<String>,
    default_latin: Option<LanguageCode>,
    default_devanagari: Option<LanguageCode>,
    #[serde(default)]
    hints: Vec<RawHintList>,
}

#[derive(Debug, Deserialize)]
struct RawHintList {
    language: LanguageCode,
    #[serde(default)]
    keywords: Vec<String>,
}

impl LanguageHints {
    /// The bundled hint lists
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read language hints {}", path.display()))?;
        Self::from_bytes(&bytes)
            .with_context(|| format!("Invalid language hints {}", path.display()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: RawHints = document::parse_document(bytes, &HINTS_SHAPE, "hints", 1)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawHints) -> Result<Self> {
        let mut lists = Vec::with_capacity(raw.hints.len());
        for list in raw.hints {
            let mut keywords = Vec::with_capacity(list.keywords.len());
            for keyword in list.keywords {
                let mut tokens = tokenize(&keyword);
                if tokens.len() != 1 {
                    return Err(TextError::InvalidKeyword {
                        language: list.language.to_string(),
                        keyword,
                    }
                    .into());
                }
                keywords.extend(tokens.pop());
            }
            keywords.sort();
            keywords.dedup();
            lists.push(HintList {
                language: list.language,
                keywords,
            });
        }

        Ok(Self {
            revision: raw.revision,
            default_latin: raw.default_latin.unwrap_or(LanguageCode::ENGLISH),
            default_devanagari: raw.default_devanagari.unwrap_or(LanguageCode::MARATHI),
            lists,
        })
    }

    fn fallback() -> Self {
        Self {
            revision: None,
            default_latin: LanguageCode::ENGLISH,
            default_devanagari: LanguageCode::MARATHI,
            lists: Vec::new(),
        }
    }

    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    #[must_use]
    pub const fn default_devanagari(&self) -> &LanguageCode {
        &self.default_devanagari
    }

    /// Languages that have a keyword list, in check order
    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.lists.iter().map(|list| &list.language)
    }

    /// Classify `text`. Pure and deterministic.
    #[must_use]
    pub fn detect(&self, text: &str) -> LanguageCode {
        if !contains_devanagari(text) {
            return self.default_latin.clone();
        }

        let tokens = tokenize(text);
        for list in &self.lists {
            if let Some(hit) = tokens
                .iter()
                .find(|token| list.keywords.binary_search(*token).is_ok())
            {
                log::debug!("Language hint '{hit}' -> {}", list.language);
                return list.language.clone();
            }
        }

        self.default_devanagari.clone()
    }
}

/// Detect the language of `text` with the bundled hint lists
#[must_use]
pub fn detect(text: &str) -> LanguageCode {
    LanguageHints::builtin().detect(text)
}
