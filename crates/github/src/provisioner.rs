//! Repository creation for codebase stages.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{info, warn};

use crate::error::{GitHubError, Result};
use crate::types::{NewRepository, Repository, SourceHost};

const MAX_NAME_LENGTH: usize = 60;
const FALLBACK_NAME: &str = "project";

static SEPARATOR_RUNS: OnceLock<Regex> = OnceLock::new();

/// Derive a URL-safe repository name from a project title.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-`, trims leading and trailing separators and caps the length.
pub fn repository_name(title: &str) -> String {
    let pattern = SEPARATOR_RUNS.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("Invalid repository name regex pattern")
    });

    let lowered = title.to_lowercase();
    let collapsed = pattern.replace_all(&lowered, "-");
    let trimmed = collapsed.trim_matches('-');
    let capped: String = trimmed.chars().take(MAX_NAME_LENGTH).collect();
    let name = capped.trim_end_matches('-');

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Creates the source repository for a project, treating a name conflict as
/// success.
pub struct RepositoryProvisioner {
    host: Arc<dyn SourceHost>,
    private: bool,
}

impl RepositoryProvisioner {
    pub fn new(host: Arc<dyn SourceHost>, private: bool) -> Self {
        Self { host, private }
    }

    /// Create (or find) the repository for `project_title`.
    ///
    /// If the provider reports that the name already exists, the existing
    /// repository's URL is rebuilt from the authenticated account's login.
    pub async fn provision(&self, project_title: &str, description: &str) -> Result<Repository> {
        let request = NewRepository {
            name: repository_name(project_title),
            description: description.to_string(),
            private: self.private,
            auto_init: true,
        };

        match self.host.create_repository(&request).await {
            Ok(repo) => {
                info!(name = %repo.name, url = %repo.html_url, "Repository created");
                Ok(repo)
            }
            Err(GitHubError::AlreadyExists(message)) => {
                warn!(name = %request.name, %message, "Repository already exists, reusing it");
                let login = self.host.current_login().await?;
                Ok(Repository {
                    html_url: self.host.repository_url(&login, &request.name),
                    name: request.name,
                })
            }
            Err(e) => Err(e),
        }
    }
}
