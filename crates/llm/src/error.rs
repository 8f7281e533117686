use thiserror::Error;

/// Generative-text service errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenRouter API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("OpenRouter rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("No token received for {0}s")]
    IdleTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for generative-text operations
pub type LlmResult<T> = Result<T, LlmError>;
