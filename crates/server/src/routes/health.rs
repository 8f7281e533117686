use axum::extract::State;
use axum::Json;
use orchestrator::Integrations;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Whether each external collaborator is wired in.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    pub openrouter: bool,
    pub notion: bool,
    pub github: bool,
    pub dashboard: bool,
}

impl From<Integrations> for IntegrationStatus {
    fn from(integrations: Integrations) -> Self {
        Self {
            openrouter: integrations.generator,
            notion: integrations.notion,
            github: integrations.github,
            dashboard: integrations.dashboard,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    version: String,
    integrations: IntegrationStatus,
}

/// Liveness plus the integrations this instance can reach. A service without
/// an OpenRouter key still reports `ok`; its executions fail individually.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        integrations: state.executor.integrations().into(),
    })
}
