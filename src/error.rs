//! Error types for the content fetch layer.
//!
//! Every transport, API, and decode failure funnels into `ContentError`.
//! "No matching record" is never an error — singleton fetches return
//! `Ok(None)` and collection fetches `Ok(vec![])` for that case, so
//! callers can tell an empty dataset from a broken fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Studio API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized — check the API token for dataset access")]
    Unauthorized,

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid query URL: {0}")]
    Url(String),

    #[error("Configuration: {0}")]
    Config(String),
}

impl ContentError {
    /// Short reason string carried into `ContentState::Failed`.
    pub fn reason(&self) -> String {
        match self {
            ContentError::Http(e) if e.is_timeout() => "request timed out".to_string(),
            ContentError::Http(e) if e.is_connect() => "could not reach the studio".to_string(),
            other => other.to_string(),
        }
    }
}
