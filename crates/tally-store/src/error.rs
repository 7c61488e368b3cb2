//! Error types for tally storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate account name).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The type of entity that was not found.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The HTTP request to the table API failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The table API answered with an error status.
    #[error("store API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Database error code, when the API reports one.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend failure not covered above.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether this error is a uniqueness violation.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Whether this error is a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
