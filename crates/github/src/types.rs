use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters for a repository to create under the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
}

/// Source-hosting operations the pipeline depends on.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Create a repository. A name conflict is reported as
    /// [`GitHubError::AlreadyExists`](crate::GitHubError::AlreadyExists).
    async fn create_repository(&self, repo: &NewRepository) -> Result<Repository>;

    /// Login of the authenticated account.
    async fn current_login(&self) -> Result<String>;

    /// Web URL of a repository owned by `owner`.
    fn repository_url(&self, owner: &str, name: &str) -> String {
        format!("https://github.com/{}/{}", owner, name)
    }
}
