use async_trait::async_trait;
use serde::Deserialize;
use stagecraft_core::Block;

use crate::error::Result;

/// A created document page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRef {
    pub id: String,
    pub url: String,
}

/// Document workspace operations used for publishing.
///
/// Both calls accept at most [`BATCH_LIMIT`](crate::BATCH_LIMIT) blocks.
#[async_trait]
pub trait DocumentWorkspace: Send + Sync {
    async fn create_page(&self, parent_id: &str, title: &str, blocks: &[Block]) -> Result<PageRef>;

    async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<()>;
}
