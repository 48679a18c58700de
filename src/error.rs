use thiserror::Error;

/// Failure of a single fetch against the catalog service.
///
/// Page-level operations surface these unchanged; lookups made while
/// assembling a record are absorbed into placeholders instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    #[error("response body was empty")]
    EmptyBody,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),
}

impl FetchError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FetchError::MalformedJson(msg.into())
    }

    /// Whether re-issuing the same request has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::BadStatus(status) => *status >= 500,
            _ => false,
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
