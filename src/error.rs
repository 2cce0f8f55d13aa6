//! Failure taxonomy for a single search attempt.
//!
//! Every variant displays as the exact text shown to the user in the notice
//! slot. None of them carry the API key.

/// Message used when a failure has no text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while searching. Please check your connection and try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Please enter a search term")]
    EmptyQuery,

    #[error(
        "API key not configured. Please add your Google Books API key to the configuration."
    )]
    NotConfigured,

    /// HTTP 403: key rejected or daily quota exhausted.
    #[error("API key is invalid or has exceeded quota. Please check your API key.")]
    Forbidden,

    /// HTTP 400.
    #[error("Invalid search query. Please try different search terms.")]
    BadRequest,

    #[error("API error: {0}. Please try again later.")]
    Status(u16),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),
}

impl SearchError {
    /// Maps a non-success HTTP status to its user-facing error.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::Forbidden,
            400 => Self::BadRequest,
            other => Self::Status(other),
        }
    }

    /// Text for the notice slot. Falls back to the generic connectivity
    /// message when the underlying failure had nothing to say.
    pub fn notice_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_owned()
        } else {
            message
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
