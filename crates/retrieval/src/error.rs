use thiserror::Error;

/// Result type for retrieval configuration
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Profile values that cannot produce a sensible ranking
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// Weight is negative, NaN or infinite
    #[error("weights.{signal} must be a finite, non-negative number (got {value})")]
    InvalidWeight { signal: &'static str, value: f32 },

    /// Every weight is zero, so every score would be zero
    #[error("at least one signal weight must be positive")]
    ZeroWeights,

    /// Half-life is negative or not finite
    #[error("recency.half_life_days must be finite and >= 0 (got {0})")]
    InvalidHalfLife(f64),

    /// Default limit is zero or above the maximum
    #[error("selection.default_limit {default_limit} must be in 1..={max_limit}")]
    InvalidLimit { default_limit: usize, max_limit: usize },

    /// Threshold outside [0, 1)
    #[error("selection.min_score must be in [0, 1) (got {0})")]
    InvalidMinScore(f32),
}
