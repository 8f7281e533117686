use llm::LlmError;
use stagecraft_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{0}")]
    Validation(#[from] CoreError),

    #[error("OpenRouter API key is not configured")]
    MissingCredential,

    #[error("Content generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Client disconnected")]
    Cancelled,

    #[error("Dashboard API error ({status}): {message}")]
    Dashboard { status: u16, message: String },

    #[error("Invalid dashboard URL: {0}")]
    InvalidDashboardUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl OrchestratorError {
    /// Failures caused by the request or configuration rather than upstream services.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingCredential)
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
