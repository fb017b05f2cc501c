use thiserror::Error;

/// Result type for knowledge store operations
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Reasons a corpus record is rejected at load time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// Required field absent or blank
    #[error("Entry {id}: missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    /// `languages` is empty after normalization
    #[error("Entry {0}: languages must not be empty")]
    EmptyLanguages(String),

    /// Language code could not be parsed
    #[error("Entry {id}: invalid language code {code:?}")]
    InvalidLanguage { id: String, code: String },

    /// `last_updated` is neither RFC 3339 nor `YYYY-MM-DD`
    #[error("Entry {id}: invalid last_updated {value:?}")]
    InvalidTimestamp { id: String, value: String },

    /// Another entry already uses this id
    #[error("Duplicate entry id: {0}")]
    DuplicateId(String),
}

impl KnowledgeError {
    /// Create a missing field error
    pub fn missing(id: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            id: id.into(),
            field,
        }
    }

    /// Id of the offending record, when it had one
    #[must_use]
    pub fn entry_id(&self) -> &str {
        match self {
            Self::MissingField { id, .. }
            | Self::InvalidLanguage { id, .. }
            | Self::InvalidTimestamp { id, .. } => id,
            Self::EmptyLanguages(id) | Self::DuplicateId(id) => id,
        }
    }
}
