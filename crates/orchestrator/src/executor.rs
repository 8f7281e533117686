//! Stage execution: validate, provision, stream, publish, terminate.

use std::sync::Arc;
use std::time::Duration;

use events::EventChannel;
use github::RepositoryProvisioner;
use llm::TextGenerator;
use notion::DeliverablePublisher;
use stagecraft_core::{AgentRoster, DeliverableKind, StageRequest, StageRequestPayload};
use tracing::{error, info, warn};

use crate::dashboard::DashboardApi;
use crate::error::{OrchestratorError, Result};
use crate::prompts::StagePrompts;
use crate::streamer::{ContentStreamer, ExecutionContext};

/// Maximum characters of streamed text echoed in an unpublished `Result`.
pub const RESULT_PREVIEW_LIMIT: usize = 500;

const PREPARING_PERCENT: u8 = 5;
const PROVISIONING_PERCENT: u8 = 10;
const PUBLISHING_PERCENT: u8 = 90;

/// What a successful execution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub content_length: usize,
    pub repository_url: Option<String>,
    pub deliverable_url: Option<String>,
}

/// Which optional collaborators an executor was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integrations {
    pub generator: bool,
    pub notion: bool,
    pub github: bool,
    pub dashboard: bool,
}

/// Runs one stage end to end and reports through an [`EventChannel`].
///
/// Collaborators are optional: without a generator every execution fails
/// validation, without a provisioner codebase stages skip repository
/// creation, and without a dashboard no project fields are recorded.
#[derive(Clone)]
pub struct StageExecutor {
    roster: Arc<AgentRoster>,
    generator: Option<Arc<dyn TextGenerator>>,
    provisioner: Option<Arc<RepositoryProvisioner>>,
    publisher: DeliverablePublisher,
    dashboard: Option<Arc<dyn DashboardApi>>,
    idle_timeout: Option<Duration>,
}

impl StageExecutor {
    pub fn new(roster: Arc<AgentRoster>) -> Self {
        Self {
            roster,
            generator: None,
            provisioner: None,
            publisher: DeliverablePublisher::disabled(),
            dashboard: None,
            idle_timeout: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_provisioner(mut self, provisioner: Arc<RepositoryProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn with_publisher(mut self, publisher: DeliverablePublisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_dashboard(mut self, dashboard: Arc<dyn DashboardApi>) -> Self {
        self.dashboard = Some(dashboard);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn integrations(&self) -> Integrations {
        Integrations {
            generator: self.generator.is_some(),
            notion: self.publisher.is_configured(),
            github: self.provisioner.is_some(),
            dashboard: self.dashboard.is_some(),
        }
    }

    /// Execute a stage. The channel is consumed and always closed with either
    /// `Complete` or `Error`; the returned value mirrors that outcome.
    pub async fn execute(
        &self,
        payload: StageRequestPayload,
        mut channel: EventChannel,
    ) -> Result<StageOutcome> {
        match self.run(payload, &mut channel).await {
            Ok(outcome) => {
                info!(
                    length = outcome.content_length,
                    deliverable = ?outcome.deliverable_url.as_deref().map(url_scheme),
                    "Stage execution completed"
                );
                channel.complete();
                Ok(outcome)
            }
            Err(e) => {
                match &e {
                    OrchestratorError::Cancelled => info!("Stage execution cancelled by client"),
                    e if e.is_validation() => warn!(error = %e, "Stage request rejected"),
                    e => error!(error = %e, "Stage execution failed"),
                }
                channel.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        payload: StageRequestPayload,
        channel: &mut EventChannel,
    ) -> Result<StageOutcome> {
        let request = StageRequest::try_from(payload)?;
        let generator = self
            .generator
            .clone()
            .ok_or(OrchestratorError::MissingCredential)?;

        let profile = self.roster.resolve(&request.agent_id);
        info!(
            task_id = %request.task_id,
            project_id = %request.project_id,
            stage = request.stage_index,
            agent = %profile.name,
            deliverable = ?request.deliverable_key,
            "Starting stage execution"
        );

        let mut ctx = ExecutionContext::new(request);
        channel.action(format!(
            "{} ({}) is starting {}",
            profile.name, profile.title, ctx.request.stage_name
        ));
        channel.progress(PREPARING_PERCENT, "Preparing stage");

        if ctx.deliverable == Some(DeliverableKind::Codebase) {
            self.provision(&mut ctx, channel).await;
        }

        let generation = StagePrompts::generation_request(
            profile,
            &ctx.request,
            ctx.deliverable.as_ref(),
            ctx.repository_url.as_deref(),
        );
        channel.action(format!("Writing {}", self.subject(&ctx)));

        ContentStreamer::new(generator)
            .with_idle_timeout(self.idle_timeout)
            .run(generation, &mut ctx, channel)
            .await?;

        let deliverable_url = match ctx.deliverable.clone() {
            Some(kind) if !ctx.content().trim().is_empty() => {
                Some(self.publish(&ctx, &kind, channel).await)
            }
            _ => {
                let preview: String = ctx.content().chars().take(RESULT_PREVIEW_LIMIT).collect();
                channel.result(preview);
                None
            }
        };

        Ok(StageOutcome {
            content_length: ctx.len(),
            repository_url: ctx.repository_url,
            deliverable_url,
        })
    }

    async fn provision(&self, ctx: &mut ExecutionContext, channel: &mut EventChannel) {
        channel.action("Creating GitHub repository");
        channel.progress(PROVISIONING_PERCENT, "Provisioning repository");

        let Some(provisioner) = &self.provisioner else {
            channel.thought("GitHub is not configured, skipping repository creation");
            return;
        };

        let description = format!("{}: {}", ctx.request.project_title, ctx.request.stage_description);
        match provisioner.provision(&ctx.request.project_title, &description).await {
            Ok(repo) => {
                channel.thought(format!("Repository ready at {}", repo.html_url));
                self.record(&ctx.request.project_id, "repoUrl", &repo.html_url)
                    .await;
                ctx.repository_url = Some(repo.html_url);
            }
            Err(e) => {
                warn!(task_id = %ctx.request.task_id, error = %e, "Repository provisioning failed");
                channel.thought(format!("Skipping repository creation: {}", e));
            }
        }
    }

    async fn publish(
        &self,
        ctx: &ExecutionContext,
        kind: &DeliverableKind,
        channel: &mut EventChannel,
    ) -> String {
        let title = kind.title();
        channel.progress(PUBLISHING_PERCENT, "Publishing deliverable");
        channel.action(format!("Publishing {} to Notion", title));

        if !self.publisher.is_configured() {
            channel.thought("Notion is not configured, attaching the document inline");
        }

        let page_title = format!("{}: {}", ctx.request.project_title, title);
        let url = self.publisher.publish(ctx.content(), &page_title).await;

        channel.deliverable(kind.key(), url.as_str());
        self.record(
            &ctx.request.project_id,
            &format!("deliverables.{}", kind.key()),
            &url,
        )
        .await;
        channel.result(format!("{} delivered", title));

        url
    }

    async fn record(&self, project_id: &str, field: &str, value: &str) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        if let Err(e) = dashboard.update_project_field(project_id, field, value).await {
            warn!(project_id, field, error = %e, "Failed to update dashboard project field");
        }
    }

    fn subject(&self, ctx: &ExecutionContext) -> String {
        match &ctx.deliverable {
            Some(kind) => kind.title(),
            None => ctx.request.stage_name.clone(),
        }
    }
}

fn url_scheme(url: &str) -> &str {
    url.split_once(':').map_or(url, |(scheme, _)| scheme)
}
