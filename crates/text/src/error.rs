use thiserror::Error;

/// Result type for text operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Errors raised while interpreting text-level configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// Language code is empty or contains characters outside `[a-z0-9-]`
    #[error("Invalid language code: {0:?}")]
    InvalidLanguageCode(String),

    /// A hint keyword does not normalize to exactly one token
    #[error("Hint keyword {keyword:?} for '{language}' must be a single token")]
    InvalidKeyword { language: String, keyword: String },
}

impl TextError {
    /// Create an invalid language code error
    pub fn invalid_language_code(code: impl Into<String>) -> Self {
        Self::InvalidLanguageCode(code.into())
    }
}
