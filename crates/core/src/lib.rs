//! Domain model shared by every crate of the stage pipeline.

pub mod domain;
pub mod error;

pub use domain::agent::{AgentKind, AgentProfile, AgentRoster};
pub use domain::block::{Block, HeadingLevel, RichTextSpan};
pub use domain::stage::{DeliverableKind, StageRequest, StageRequestPayload};
pub use error::CoreError;
