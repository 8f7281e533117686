pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stagecraft API",
        version = "0.1.0",
        description = "Stage execution and deliverable publishing for the product pipeline"
    ),
    paths(routes::health_check, routes::pipeline::execute_stage),
    components(schemas(
        routes::HealthResponse,
        routes::IntegrationStatus,
        error::ErrorResponse,
        stagecraft_core::StageRequestPayload,
        events::ProgressEvent,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pipeline", description = "Stage execution with streamed progress (SSE)"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route(
            "/api/pipeline/execute-stage",
            post(routes::pipeline::execute_stage),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
