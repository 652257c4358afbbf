//! Collaborator failure taxonomy

use thiserror::Error;

/// Every way a content-generation call can fail.
///
/// These never reach the user; [`super::Coach`] logs them and substitutes
/// fallback content.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unparseable model output: {0}")]
    Parse(String),

    #[error("model returned empty content")]
    Empty,
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(e: serde_json::Error) -> Self {
        CollaboratorError::Parse(e.to_string())
    }
}
