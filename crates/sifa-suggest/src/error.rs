use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid endpoint {0}: {1}")]
    InvalidEndpoint(String, String),
}

impl SuggestError {
    /// Transport-level failures, as opposed to a bad endpoint or payload.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, SuggestError>;
