use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

/// Inbound stage execution request as it arrives on the wire.
///
/// Every field is optional here so that a missing field becomes a validation
/// error reported on the event channel rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export, rename = "StageRequest"))]
pub struct StageRequestPayload {
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub project_title: Option<String>,
    pub stage_index: Option<u32>,
    pub stage_name: Option<String>,
    pub stage_description: Option<String>,
    pub agent_id: Option<String>,
    pub deliverable_key: Option<String>,
}

/// A validated stage request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    pub task_id: String,
    pub project_id: String,
    pub project_title: String,
    pub stage_index: u32,
    pub stage_name: String,
    pub stage_description: String,
    pub agent_id: String,
    pub deliverable_key: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::MissingField(field)),
    }
}

impl TryFrom<StageRequestPayload> for StageRequest {
    type Error = CoreError;

    fn try_from(payload: StageRequestPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            task_id: required(payload.task_id, "taskId")?,
            project_id: required(payload.project_id, "projectId")?,
            project_title: required(payload.project_title, "projectTitle")?,
            stage_index: payload
                .stage_index
                .ok_or(CoreError::MissingField("stageIndex"))?,
            stage_name: required(payload.stage_name, "stageName")?,
            stage_description: required(payload.stage_description, "stageDescription")?,
            agent_id: required(payload.agent_id, "agentId")?,
            deliverable_key: payload
                .deliverable_key
                .filter(|key| !key.trim().is_empty()),
        })
    }
}

impl StageRequest {
    pub fn deliverable(&self) -> Option<DeliverableKind> {
        self.deliverable_key.as_deref().map(DeliverableKind::from_key)
    }
}

/// The artifact a stage produces, selected by its deliverable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeliverableKind {
    ProjectBrief,
    MarketResearch,
    ProductStrategy,
    TechnicalArchitecture,
    DesignSpec,
    Codebase,
    TestPlan,
    LaunchPlan,
    /// Unrecognised key; uses the generic completion template.
    Other(String),
}

impl DeliverableKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "project_brief" => Self::ProjectBrief,
            "market_research" => Self::MarketResearch,
            "product_strategy" => Self::ProductStrategy,
            "technical_architecture" => Self::TechnicalArchitecture,
            "design_spec" => Self::DesignSpec,
            "codebase" => Self::Codebase,
            "test_plan" => Self::TestPlan,
            "launch_plan" => Self::LaunchPlan,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::ProjectBrief => "project_brief",
            Self::MarketResearch => "market_research",
            Self::ProductStrategy => "product_strategy",
            Self::TechnicalArchitecture => "technical_architecture",
            Self::DesignSpec => "design_spec",
            Self::Codebase => "codebase",
            Self::TestPlan => "test_plan",
            Self::LaunchPlan => "launch_plan",
            Self::Other(key) => key,
        }
    }

    /// Human-readable title used for the published document.
    pub fn title(&self) -> String {
        match self {
            Self::ProjectBrief => "Project Brief".to_string(),
            Self::MarketResearch => "Market Research Report".to_string(),
            Self::ProductStrategy => "Product Strategy".to_string(),
            Self::TechnicalArchitecture => "Technical Architecture".to_string(),
            Self::DesignSpec => "Design Specification".to_string(),
            Self::Codebase => "Codebase Overview".to_string(),
            Self::TestPlan => "Test Plan".to_string(),
            Self::LaunchPlan => "Launch Plan".to_string(),
            Self::Other(key) => title_case(key),
        }
    }
}

fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
