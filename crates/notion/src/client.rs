use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use stagecraft_core::Block;
use tracing::{debug, error};

use crate::error::{NotionError, Result};
use crate::publisher::BATCH_LIMIT;
use crate::types::to_notion_blocks;
use crate::workspace::{DocumentWorkspace, PageRef};
use crate::{DEFAULT_BASE_URL, NOTION_VERSION};

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Notion REST client
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
    }

    fn check_batch(blocks: &[Block]) -> Result<()> {
        if blocks.len() > BATCH_LIMIT {
            return Err(NotionError::BatchTooLarge {
                size: blocks.len(),
                max: BATCH_LIMIT,
            });
        }
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<NotionErrorBody>(&error_text) {
        Ok(body) => {
            error!(code = ?body.code, "Notion API error: {}", body.message);
            body.message
        }
        Err(_) => error_text,
    };

    Err(NotionError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentWorkspace for NotionClient {
    async fn create_page(&self, parent_id: &str, title: &str, blocks: &[Block]) -> Result<PageRef> {
        Self::check_batch(blocks)?;
        debug!(parent_id, title, blocks = blocks.len(), "Creating Notion page");

        let body = json!({
            "parent": { "page_id": parent_id },
            "properties": {
                "title": {
                    "title": [{ "type": "text", "text": { "content": title } }]
                }
            },
            "children": to_notion_blocks(blocks),
        });

        let response = self
            .authorized(self.client.post(format!("{}/pages", self.base_url)))
            .json(&body)
            .send()
            .await?;

        let page = check_status(response).await?.json::<PageRef>().await?;
        Ok(page)
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<()> {
        Self::check_batch(blocks)?;
        debug!(page_id, blocks = blocks.len(), "Appending blocks to Notion page");

        let body = json!({ "children": to_notion_blocks(blocks) });

        let response = self
            .authorized(
                self.client
                    .patch(format!("{}/blocks/{}/children", self.base_url, page_id)),
            )
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
