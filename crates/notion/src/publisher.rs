//! Deliverable publishing with a self-contained fallback.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use document::BlockConverter;
use tracing::{info, warn};

use crate::error::Result;
use crate::workspace::DocumentWorkspace;

/// Maximum blocks accepted by a single create or append call.
pub const BATCH_LIMIT: usize = 100;

/// A configured workspace plus the page new deliverables are created under.
#[derive(Clone)]
pub struct PublishTarget {
    pub workspace: Arc<dyn DocumentWorkspace>,
    pub parent_page_id: String,
}

/// Encode markdown as a `data:text/markdown;base64,...` URL.
pub fn fallback_url(markdown: &str) -> String {
    format!("data:text/markdown;base64,{}", STANDARD.encode(markdown))
}

/// Publishes markdown deliverables and always hands back a retrievable URL.
///
/// With a target configured, the document is converted to blocks, the first
/// [`BATCH_LIMIT`] go into the new page and the remainder is appended in
/// batches. A failed append is logged and skipped; the page URL is still
/// returned. Without a target, or when page creation fails, the markdown is
/// returned inline as a data URL.
#[derive(Clone)]
pub struct DeliverablePublisher {
    target: Option<PublishTarget>,
    converter: BlockConverter,
}

impl DeliverablePublisher {
    pub fn new(target: Option<PublishTarget>) -> Self {
        Self {
            target,
            converter: BlockConverter::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    pub async fn publish(&self, markdown: &str, title: &str) -> String {
        let Some(target) = &self.target else {
            info!(title, "No document workspace configured, using inline fallback");
            return fallback_url(markdown);
        };

        match self.publish_to(target, markdown, title).await {
            Ok(url) => url,
            Err(e) => {
                warn!(title, error = %e, "Publishing failed, using inline fallback");
                fallback_url(markdown)
            }
        }
    }

    async fn publish_to(&self, target: &PublishTarget, markdown: &str, title: &str) -> Result<String> {
        let blocks = self.converter.convert(markdown);
        let mut batches = blocks.chunks(BATCH_LIMIT);
        let first = batches.next().unwrap_or(&[]);

        let page = target
            .workspace
            .create_page(&target.parent_page_id, title, first)
            .await?;

        for (index, batch) in batches.enumerate() {
            if let Err(e) = target.workspace.append_blocks(&page.id, batch).await {
                warn!(
                    page_id = %page.id,
                    batch = index + 1,
                    size = batch.len(),
                    error = %e,
                    "Failed to append block batch, continuing"
                );
            }
        }

        info!(title, url = %page.url, blocks = blocks.len(), "Deliverable published");
        Ok(page.url)
    }
}
