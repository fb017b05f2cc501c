use std::path::Path;

use anyhow::{Context, Result};
use kisan_text::document::{self, Shape};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

const BUILTIN_DEFAULT: &str = include_str!("../../../profiles/retrieval.json");

const WEIGHTS_SHAPE: Shape = Shape::Object(&[
    ("lexical", Shape::Leaf),
    ("tag", Shape::Leaf),
    ("region", Shape::Leaf),
    ("language", Shape::Leaf),
    ("recency", Shape::Leaf),
]);
const PROFILE_SHAPE: Shape = Shape::Object(&[
    ("schema_version", Shape::Leaf),
    ("name", Shape::Leaf),
    ("description", Shape::Leaf),
    ("weights", WEIGHTS_SHAPE),
    ("recency", Shape::Object(&[("half_life_days", Shape::Leaf)])),
    (
        "selection",
        Shape::Object(&[
            ("default_limit", Shape::Leaf),
            ("max_limit", Shape::Leaf),
            ("min_score", Shape::Leaf),
            ("require_topical_signal", Shape::Leaf),
        ]),
    ),
    (
        "language",
        Shape::Object(&[("detect_when_unspecified", Shape::Leaf)]),
    ),
    ("context", Shape::Object(&[("max_summary_chars", Shape::Leaf)])),
]);

static BUILTIN_RAW: Lazy<RawProfile> = Lazy::new(|| {
    parse_raw(BUILTIN_DEFAULT.as_bytes()).unwrap_or_else(|err| {
        log::error!("Bundled retrieval profile is invalid: {err:#}");
        RawProfile::default()
    })
});

/// Tunable knobs of the scoring pipeline.
///
/// Loaded from a JSON or TOML document; fields missing from an operator
/// profile fall back to the bundled `default` profile.
#[derive(Clone, Debug, Serialize)]
pub struct RetrievalProfile {
    name: String,
    description: Option<String>,
    weights: ScoringWeights,
    recency: RecencyConfig,
    selection: SelectionConfig,
    language: LanguageConfig,
    context: ContextConfig,
}

/// Per-signal weights of the final weighted sum
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub lexical: f32,
    pub tag: f32,
    pub region: f32,
    pub language: f32,
    pub recency: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            lexical: 0.5,
            tag: 0.25,
            region: 0.1,
            language: 0.1,
            recency: 0.05,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> std::result::Result<(), RetrievalError> {
        let named = [
            ("lexical", self.lexical),
            ("tag", self.tag),
            ("region", self.region),
            ("language", self.language),
            ("recency", self.recency),
        ];
        for (signal, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(RetrievalError::InvalidWeight { signal, value });
            }
        }
        if named.iter().all(|(_, value)| *value == 0.0) {
            return Err(RetrievalError::ZeroWeights);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RecencyConfig {
    /// Age at which the recency signal halves; 0 disables it
    pub half_life_days: f64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            half_life_days: 365.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SelectionConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Entries must score strictly above this
    pub min_score: f32,
    /// When set, a language match alone does not qualify an entry
    pub require_topical_signal: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_limit: 4,
            max_limit: 20,
            min_score: 0.0,
            require_topical_signal: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LanguageConfig {
    /// Detect the question's language when the caller gives no preference
    pub detect_when_unspecified: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            detect_when_unspecified: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ContextConfig {
    /// Summaries longer than this are truncated in the context block; 0 = unbounded
    pub max_summary_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_summary_chars: 600,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawProfile {
    #[allow(dead_code)]
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    weights: Option<RawWeights>,
    recency: Option<RawRecency>,
    selection: Option<RawSelection>,
    language: Option<RawLanguage>,
    context: Option<RawContext>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawWeights {
    lexical: Option<f32>,
    tag: Option<f32>,
    region: Option<f32>,
    language: Option<f32>,
    recency: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawRecency {
    half_life_days: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawSelection {
    default_limit: Option<usize>,
    max_limit: Option<usize>,
    min_score: Option<f32>,
    require_topical_signal: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawLanguage {
    detect_when_unspecified: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawContext {
    max_summary_chars: Option<usize>,
}

impl Default for RetrievalProfile {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RetrievalProfile {
    /// The bundled `default` profile
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_raw(BUILTIN_RAW.clone(), "default").unwrap_or_else(|err| {
            log::error!("Bundled retrieval profile failed validation: {err:#}");
            Self::hardcoded()
        })
    }

    fn hardcoded() -> Self {
        Self {
            name: "default".to_string(),
            description: None,
            weights: ScoringWeights::default(),
            recency: RecencyConfig::default(),
            selection: SelectionConfig::default(),
            language: LanguageConfig::default(),
            context: ContextConfig::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        let fallback = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom");
        Self::from_bytes(fallback, &bytes)
    }

    /// Parse an operator profile and overlay it onto the bundled defaults
    pub fn from_bytes(profile_name: &str, bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes)
            .with_context(|| format!("Profile '{profile_name}' is not a valid retrieval profile"))?;
        let (name, description) = (raw.name.clone(), raw.description.clone());
        let mut merged = merge_raw_profiles(BUILTIN_RAW.clone(), raw);
        merged.name = name;
        merged.description = description;
        Self::from_raw(merged, profile_name)
    }

    /// Replace the weights, keeping everything else
    pub fn with_weights(mut self, weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Toggle the topical-signal requirement
    #[must_use]
    pub fn require_topical_signal(mut self, required: bool) -> Self {
        self.selection.require_topical_signal = required;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    #[must_use]
    pub const fn recency(&self) -> &RecencyConfig {
        &self.recency
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionConfig {
        &self.selection
    }

    #[must_use]
    pub const fn language(&self) -> &LanguageConfig {
        &self.language
    }

    #[must_use]
    pub const fn context(&self) -> &ContextConfig {
        &self.context
    }

    /// Resolve a caller limit: default when absent, clamped to the maximum
    #[must_use]
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.selection.default_limit)
            .min(self.selection.max_limit)
    }

    fn from_raw(raw: RawProfile, fallback_name: &str) -> Result<Self> {
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let weights = merge_weights(raw.weights);
        weights
            .validate()
            .with_context(|| format!("Invalid weights for profile '{name}'"))?;

        let recency = RecencyConfig {
            half_life_days: raw
                .recency
                .and_then(|r| r.half_life_days)
                .unwrap_or(RecencyConfig::default().half_life_days),
        };
        if !recency.half_life_days.is_finite() || recency.half_life_days < 0.0 {
            return Err(RetrievalError::InvalidHalfLife(recency.half_life_days).into());
        }

        let selection = merge_selection(raw.selection);
        if selection.default_limit == 0 || selection.default_limit > selection.max_limit {
            return Err(RetrievalError::InvalidLimit {
                default_limit: selection.default_limit,
                max_limit: selection.max_limit,
            }
            .into());
        }
        if !(0.0..1.0).contains(&selection.min_score) {
            return Err(RetrievalError::InvalidMinScore(selection.min_score).into());
        }

        let language = LanguageConfig {
            detect_when_unspecified: raw
                .language
                .and_then(|l| l.detect_when_unspecified)
                .unwrap_or(LanguageConfig::default().detect_when_unspecified),
        };
        let context = ContextConfig {
            max_summary_chars: raw
                .context
                .and_then(|c| c.max_summary_chars)
                .unwrap_or(ContextConfig::default().max_summary_chars),
        };

        Ok(Self {
            name,
            description: raw.description,
            weights,
            recency,
            selection,
            language,
            context,
        })
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawProfile> {
    document::parse_document(bytes, &PROFILE_SHAPE, "profile", 1)
}

fn merge_weights(raw: Option<RawWeights>) -> ScoringWeights {
    let defaults = ScoringWeights::default();
    let raw = raw.unwrap_or_default();
    ScoringWeights {
        lexical: raw.lexical.unwrap_or(defaults.lexical),
        tag: raw.tag.unwrap_or(defaults.tag),
        region: raw.region.unwrap_or(defaults.region),
        language: raw.language.unwrap_or(defaults.language),
        recency: raw.recency.unwrap_or(defaults.recency),
    }
}

fn merge_selection(raw: Option<RawSelection>) -> SelectionConfig {
    let defaults = SelectionConfig::default();
    let raw = raw.unwrap_or_default();
    SelectionConfig {
        default_limit: raw.default_limit.unwrap_or(defaults.default_limit),
        max_limit: raw.max_limit.unwrap_or(defaults.max_limit),
        min_score: raw.min_score.unwrap_or(defaults.min_score),
        require_topical_signal: raw
            .require_topical_signal
            .unwrap_or(defaults.require_topical_signal),
    }
}

/// Field-by-field overlay of the tuning sections; name and description are set by the caller
fn merge_raw_profiles(mut base: RawProfile, overlay: RawProfile) -> RawProfile {
    base.weights = merge_option(base.weights, overlay.weights, |b, o| RawWeights {
        lexical: o.lexical.or(b.lexical),
        tag: o.tag.or(b.tag),
        region: o.region.or(b.region),
        language: o.language.or(b.language),
        recency: o.recency.or(b.recency),
    });
    base.recency = merge_option(base.recency, overlay.recency, |b, o| RawRecency {
        half_life_days: o.half_life_days.or(b.half_life_days),
    });
    base.selection = merge_option(base.selection, overlay.selection, |b, o| RawSelection {
        default_limit: o.default_limit.or(b.default_limit),
        max_limit: o.max_limit.or(b.max_limit),
        min_score: o.min_score.or(b.min_score),
        require_topical_signal: o.require_topical_signal.or(b.require_topical_signal),
    });
    base.language = merge_option(base.language, overlay.language, |b, o| RawLanguage {
        detect_when_unspecified: o.detect_when_unspecified.or(b.detect_when_unspecified),
    });
    base.context = merge_option(base.context, overlay.context, |b, o| RawContext {
        max_summary_chars: o.max_summary_chars.or(b.max_summary_chars),
    });
    base
}

fn merge_option<T>(base: Option<T>, overlay: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, overlay) {
        (base, None) => base,
        (None, Some(overlay)) => Some(overlay),
        (Some(base), Some(overlay)) => Some(merge(base, overlay)),
    }
}

impl std::fmt::Display for ScoringWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lexical={} tag={} region={} language={} recency={}",
            self.lexical, self.tag, self.region, self.language, self.recency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_builtin_default() {
        let profile = RetrievalProfile::builtin();
        assert_eq!(profile.name(), "default");
        assert_eq!(*profile.weights(), ScoringWeights::default());
        assert_eq!(profile.selection().default_limit, 4);
        assert!(profile.language().detect_when_unspecified);
        assert_eq!(profile.context().max_summary_chars, 600);
    }

    #[test]
    fn overlay_overrides_only_specified_fields() {
        let profile = RetrievalProfile::from_bytes(
            "kharif",
            br#"{"weights": {"tag": 0.6}, "selection": {"default_limit": 6}}"#,
        )
        .unwrap();
        assert_eq!(profile.name(), "kharif");
        assert!((profile.weights().tag - 0.6).abs() < f32::EPSILON);
        assert!((profile.weights().lexical - 0.5).abs() < f32::EPSILON);
        assert_eq!(profile.selection().default_limit, 6);
        assert_eq!(profile.selection().max_limit, 20);
    }

    #[test]
    fn accepts_toml_profiles() {
        let profile = RetrievalProfile::from_bytes(
            "toml",
            b"name = \"rabi\"\n[recency]\nhalf_life_days = 90.0\n",
        )
        .unwrap();
        assert_eq!(profile.name(), "rabi");
        assert!((profile.recency().half_life_days - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unknown_fields_with_paths() {
        let err = RetrievalProfile::from_bytes(
            "custom",
            br#"{"weights": {"lexcial": 0.4}, "selecton": {}}"#,
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("weights.lexcial"), "{msg}");
        assert!(msg.contains("selecton"), "{msg}");
    }

    #[test]
    fn rejects_unsupported_schema_version() {
        let err = RetrievalProfile::from_bytes("x", br#"{"schema_version": 2}"#).unwrap_err();
        assert!(format!("{err:#}").contains("profile.schema_version"));
    }

    #[test]
    fn rejects_invalid_weights_and_limits() {
        let negative = RetrievalProfile::from_bytes("x", br#"{"weights": {"tag": -1.0}}"#);
        assert!(format!("{:#}", negative.unwrap_err()).contains("weights.tag"));

        let zero = RetrievalProfile::from_bytes(
            "x",
            br#"{"weights": {"lexical": 0, "tag": 0, "region": 0, "language": 0, "recency": 0}}"#,
        );
        assert!(format!("{:#}", zero.unwrap_err()).contains("at least one"));

        let limit = RetrievalProfile::from_bytes("x", br#"{"selection": {"default_limit": 0}}"#);
        assert!(format!("{:#}", limit.unwrap_err()).contains("default_limit"));

        assert!(RetrievalProfile::from_bytes("x", br#"{"selection": {"min_score": 1.5}}"#).is_err());
        assert!(
            RetrievalProfile::from_bytes("x", br#"{"recency": {"half_life_days": -3}}"#).is_err()
        );
    }

    #[test]
    fn effective_limit_defaults_and_clamps() {
        let profile = RetrievalProfile::builtin();
        assert_eq!(profile.effective_limit(None), 4);
        assert_eq!(profile.effective_limit(Some(2)), 2);
        assert_eq!(profile.effective_limit(Some(0)), 0);
        assert_eq!(profile.effective_limit(Some(500)), 20);
    }

    #[test]
    fn with_weights_validates() {
        let zero = ScoringWeights {
            lexical: 0.0,
            tag: 0.0,
            region: 0.0,
            language: 0.0,
            recency: 0.0,
        };
        assert!(RetrievalProfile::builtin().with_weights(zero).is_err());
    }
}
