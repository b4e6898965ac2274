mod gemini;

pub use gemini::*;

use thiserror::Error;

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Failure modes for outbound Gemini API calls.
///
/// Transport problems and upstream rejections are normalized here so the
/// handlers can map each to an HTTP status plus `{"error": message}` envelope.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Request to Gemini API timed out")]
    Timeout,
    #[error("Could not connect to Gemini API")]
    Connection,
    /// Upstream answered with a non-success status. `message` carries the
    /// upstream `error.message` when the body is structured JSON, otherwise
    /// the raw body text.
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Unexpected(String),
}

impl GeminiError {
    /// HTTP status this error maps to at the handler boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Timeout => 504,
            Self::Connection => 502,
            Self::Upstream { status, .. } => *status,
            Self::Unexpected(_) => 500,
        }
    }

    /// Classify a reqwest transport failure. The URL is dropped before
    /// stringification; it carries the API key as a query parameter.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else {
            Self::Unexpected(err.without_url().to_string())
        }
    }
}
