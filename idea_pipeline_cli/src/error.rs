//! Typed errors for each pipeline stage.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout:?} rendering {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("page script failed: {0}")]
    Script(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no recognizable title on {url}")]
    NoTitle { url: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    /// 403 from the endpoint.
    #[error("translation endpoint rejected credentials: {0}")]
    Auth(String),

    #[error("unsupported language pair {source_lang}->{target_lang}: {message}")]
    UnsupportedLanguage {
        source_lang: String,
        target_lang: String,
        message: String,
    },

    #[error("rate limited by translation endpoint")]
    RateLimited,

    #[error("translation server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("translation request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response from translation endpoint: {0}")]
    InvalidResponse(String),

    #[error("translation endpoint misconfigured: {0}")]
    Config(String),
}

impl TranslateError {
    /// Worth another attempt after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslateError::RateLimited | TranslateError::Server { .. } | TranslateError::Network(_)
        )
    }

    /// Affects every call, not just the current field.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            TranslateError::Auth(_)
                | TranslateError::UnsupportedLanguage { .. }
                | TranslateError::Config(_)
        )
    }
}

pub type ExtractResult<T> = std::result::Result<T, ExtractionError>;

pub type TranslateResult<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(TranslateError::RateLimited.is_retryable());
        assert!(TranslateError::Network("reset".into()).is_retryable());
        assert!(TranslateError::Server { status: 502, message: String::new() }.is_retryable());

        let auth = TranslateError::Auth("bad key".into());
        assert!(!auth.is_retryable());
        assert!(auth.is_systemic());

        let rejected = TranslateError::Rejected { status: 400, message: "q too long".into() };
        assert!(!rejected.is_retryable());
        assert!(!rejected.is_systemic());
    }
}
