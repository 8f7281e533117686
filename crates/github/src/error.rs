use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Repository already exists: {0}")]
    AlreadyExists(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimitExceeded { reset_at: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<octocrab::Error> for GitHubError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => {
                let details = source
                    .errors
                    .as_ref()
                    .map(|errors| {
                        errors
                            .iter()
                            .map(|e| e.to_string())
                            .collect::<Vec<_>>()
                            .join("; ")
                    })
                    .unwrap_or_default();

                if source.message.contains("Bad credentials") {
                    GitHubError::Authentication(source.message.clone())
                } else if source.message.contains("rate limit") {
                    GitHubError::RateLimitExceeded {
                        reset_at: "unknown".to_string(),
                    }
                } else if mentions_already_exists(&source.message)
                    || mentions_already_exists(&details)
                {
                    GitHubError::AlreadyExists(source.message.clone())
                } else if details.is_empty() {
                    GitHubError::Api(source.message.clone())
                } else {
                    GitHubError::Api(format!("{} ({})", source.message, details))
                }
            }
            _ => GitHubError::Api(err.to_string()),
        }
    }
}

pub(crate) fn mentions_already_exists(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already exists")
}

pub type Result<T> = std::result::Result<T, GitHubError>;
