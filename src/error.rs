//! Error types for the finance tracker library.

/// All errors that can occur when using the finance tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// HTTP transport failed.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A backend URL could not be parsed or joined.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the backend.
        message: String,
    },

    /// The backend does not have the expected tables yet.
    #[error("database tables not found; set up the backend schema first")]
    MissingTables,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    Configuration(&'static str),

    /// Input rejected before reaching the backend.
    #[error("validation failed: {0}")]
    Validation(String),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, TrackerError>;
