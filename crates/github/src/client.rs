use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::error::{GitHubError, Result};
use crate::types::{NewRepository, Repository, SourceHost};

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(Self { octocrab })
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
        info!("Creating repository: {} (private: {})", repo.name, repo.private);

        let created: octocrab::models::Repository =
            self.octocrab.post("/user/repos", Some(repo)).await?;

        let html_url = match created.html_url {
            Some(url) => url.to_string(),
            None => {
                let owner = created
                    .owner
                    .map(|o| o.login)
                    .ok_or_else(|| GitHubError::Api("Created repository has no owner".to_string()))?;
                self.repository_url(&owner, &created.name)
            }
        };

        Ok(Repository {
            name: created.name,
            html_url,
        })
    }

    async fn current_login(&self) -> Result<String> {
        debug!("Getting authenticated user");

        let user = self.octocrab.current().user().await?;
        Ok(user.login)
    }
}
