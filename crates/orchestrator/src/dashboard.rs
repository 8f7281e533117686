use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::error::{OrchestratorError, Result};

/// Field updates on the dashboard's project records.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn update_project_field(&self, project_id: &str, field: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct FieldUpdate<'a> {
    field: &'a str,
    value: &'a str,
}

/// HTTP client for the dashboard persistence API.
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/api/projects/{project_id}`, with the id escaped as a single path segment.
    fn project_url(&self, project_id: &str) -> Result<Url> {
        let invalid = || OrchestratorError::InvalidDashboardUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "projects", project_id]);
        Ok(url)
    }
}

#[async_trait]
impl DashboardApi for DashboardClient {
    async fn update_project_field(&self, project_id: &str, field: &str, value: &str) -> Result<()> {
        debug!(project_id, field, "Updating dashboard project field");

        let response = self
            .client
            .patch(self.project_url(project_id)?)
            .json(&FieldUpdate { field, value })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(OrchestratorError::Dashboard {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_update_sends_field_and_value() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/projects/proj-1"))
            .and(body_json(serde_json::json!({
                "field": "deliverables.project_brief",
                "value": "https://www.notion.so/page-1"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = DashboardClient::new(format!("{}/", server.uri()));
        client
            .update_project_field(
                "proj-1",
                "deliverables.project_brief",
                "https://www.notion.so/page-1",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_project_id_is_escaped_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/projects/team%2Falpha%3Fdraft"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        DashboardClient::new(server.uri())
            .update_project_field("team/alpha?draft", "repoUrl", "https://github.com/a/b")
            .await
            .unwrap();
    }

    #[test]
    fn test_project_url_keeps_base_path() {
        let client = DashboardClient::new("http://localhost:3000/dashboard/");
        assert_eq!(
            client.project_url("proj-1").unwrap().as_str(),
            "http://localhost:3000/dashboard/api/projects/proj-1"
        );
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_reported() {
        let err = DashboardClient::new("not a url")
            .update_project_field("proj-1", "repoUrl", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidDashboardUrl(_)));
    }

    #[tokio::test]
    async fn test_update_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404).set_body_string("project not found"))
            .mount(&server)
            .await;

        let err = DashboardClient::new(server.uri())
            .update_project_field("missing", "repoUrl", "https://github.com/a/b")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::Dashboard { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "project not found");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
