//! Gemini client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini quota exhausted (HTTP 429)")]
    RateLimit,

    #[error("Gemini rejected the API key")]
    Unauthorized,

    #[error("Gemini returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Gemini payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read file for upload: {0}")]
    Io(#[from] std::io::Error),

    /// No candidates, usually because the prompt was blocked
    #[error("Gemini returned no candidates")]
    EmptyResponse,
}
