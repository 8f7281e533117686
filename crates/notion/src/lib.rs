//! Document workspace publishing
//!
//! - [`DocumentWorkspace`]: page creation and block append contract
//! - [`NotionClient`]: Notion REST implementation
//! - [`DeliverablePublisher`]: markdown → blocks → batched publish, with a
//!   self-contained `data:` URL fallback when the workspace is unavailable

pub mod client;
pub mod error;
pub mod publisher;
pub mod types;
pub mod workspace;

pub use client::NotionClient;
pub use error::{NotionError, Result};
pub use publisher::{fallback_url, DeliverablePublisher, PublishTarget, BATCH_LIMIT};
pub use workspace::{DocumentWorkspace, PageRef};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";
