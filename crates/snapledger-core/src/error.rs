//! Error types for snapledger

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The AI response was malformed or failed schema validation.
    /// Always triggers the rule-based fallback, never surfaced to callers.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The backend call exceeded the caller-side deadline.
    /// Treated exactly like any other extraction failure.
    #[error("Backend call timed out after {0}s")]
    Timeout(u64),

    /// Empty or missing raw OCR text. Fatal, no extraction attempted.
    #[error("No text to extract from")]
    EmptyInput,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this error should trigger the rule-based fallback path
    /// rather than propagating to the caller.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Error::Extraction(_) | Error::Timeout(_) | Error::Http(_) | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_trigger_fallback() {
        assert!(Error::Extraction("bad category".into()).triggers_fallback());
        assert!(Error::Timeout(30).triggers_fallback());
    }

    #[test]
    fn input_errors_do_not_trigger_fallback() {
        assert!(!Error::EmptyInput.triggers_fallback());
        assert!(!Error::NotFound("tx 7".into()).triggers_fallback());
    }
}
