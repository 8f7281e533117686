use std::sync::Arc;

use github::{GitHubClient, RepositoryProvisioner};
use llm::OpenRouterClient;
use notion::{DeliverablePublisher, NotionClient, PublishTarget};
use orchestrator::{DashboardClient, StageExecutor};
use stagecraft_core::AgentRoster;
use tracing::{info, warn};

use crate::config::StagecraftConfig;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<StageExecutor>,
}

impl AppState {
    pub fn new(executor: StageExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Wire the executor's collaborators from configuration.
    ///
    /// Anything left unconfigured degrades: no OpenRouter key fails every
    /// execution, no Notion target publishes inline, no GitHub token skips
    /// repository creation, no dashboard URL skips field updates.
    pub fn from_config(config: &StagecraftConfig) -> Self {
        let mut executor = StageExecutor::new(Arc::new(AgentRoster::builtin()))
            .with_idle_timeout(config.idle_timeout());

        match config.openrouter_key() {
            Some(key) => {
                info!(model = %config.openrouter.model, "OpenRouter configured");
                executor = executor.with_generator(Arc::new(OpenRouterClient::new(
                    key.to_string(),
                    config.openrouter.base_url.clone(),
                    config.openrouter.model.clone(),
                )));
            }
            None => warn!("OPENROUTER_API_KEY is not set, stage executions will be rejected"),
        }

        match config.notion_target() {
            Some((token, parent_page_id)) => {
                info!("Notion publishing configured");
                let client =
                    NotionClient::with_base_url(token.to_string(), config.notion.base_url.clone());
                executor = executor.with_publisher(DeliverablePublisher::new(Some(PublishTarget {
                    workspace: Arc::new(client),
                    parent_page_id: parent_page_id.to_string(),
                })));
            }
            None => info!("Notion is not configured, deliverables will be returned inline"),
        }

        if let Some(token) = config.github_token() {
            match GitHubClient::new(token) {
                Ok(client) => {
                    info!("GitHub repository provisioning configured");
                    let provisioner =
                        RepositoryProvisioner::new(Arc::new(client), config.github.private_repos);
                    executor = executor.with_provisioner(Arc::new(provisioner));
                }
                Err(e) => warn!(error = %e, "Failed to build GitHub client, provisioning disabled"),
            }
        }

        if let Some(url) = config.dashboard_url() {
            info!(url, "Dashboard updates configured");
            executor = executor.with_dashboard(Arc::new(DashboardClient::new(url)));
        }

        Self::new(executor)
    }
}
