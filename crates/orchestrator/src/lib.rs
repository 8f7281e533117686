pub mod dashboard;
pub mod error;
pub mod executor;
pub mod prompts;
pub mod streamer;

pub use dashboard::{DashboardApi, DashboardClient};
pub use error::{OrchestratorError, Result};
pub use executor::{Integrations, StageExecutor, StageOutcome};
pub use prompts::StagePrompts;
pub use streamer::{ContentStreamer, ExecutionContext};
