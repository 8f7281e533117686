//! Event types streamed to the caller during a stage execution

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single status update from the pipeline.
///
/// Serialized with a `type` discriminant, e.g.
/// `{"type":"progress","percent":40,"step":"Writing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum ProgressEvent {
    /// Narration of what the agent is thinking about
    Thought { content: String },

    /// A concrete step the pipeline is taking
    Action { content: String },

    /// Completion estimate, 0..=100, never decreasing within one execution
    Progress { percent: u8, step: String },

    /// Summary of the stage outcome
    Result { content: String },

    /// Location of the published artifact
    Deliverable { key: String, url: String },

    /// Terminal success
    Complete,

    /// Terminal failure
    Error { content: String },
}

impl ProgressEvent {
    pub fn thought(content: impl Into<String>) -> Self {
        Self::Thought {
            content: content.into(),
        }
    }

    pub fn action(content: impl Into<String>) -> Self {
        Self::Action {
            content: content.into(),
        }
    }

    pub fn progress(percent: u8, step: impl Into<String>) -> Self {
        Self::Progress {
            percent,
            step: step.into(),
        }
    }

    pub fn result(content: impl Into<String>) -> Self {
        Self::Result {
            content: content.into(),
        }
    }

    pub fn deliverable(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Deliverable {
            key: key.into(),
            url: url.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: content.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Thought { .. } => "thought",
            Self::Action { .. } => "action",
            Self::Progress { .. } => "progress",
            Self::Result { .. } => "result",
            Self::Deliverable { .. } => "deliverable",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
        }
    }
}
