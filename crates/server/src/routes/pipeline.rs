use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use events::{EventChannel, ProgressEvent};
use futures::stream::{Stream, StreamExt};
use stagecraft_core::StageRequestPayload;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;

pub const SSE_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

fn progress_to_sse_event(event: &ProgressEvent) -> Result<Event, Infallible> {
    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize progress event");
        r#"{"type":"error","content":"Failed to serialize progress event"}"#.to_string()
    });

    Ok(Event::default().data(data))
}

/// Run one pipeline stage and stream its progress events.
///
/// Each SSE record carries a single JSON `ProgressEvent` in `data`. The
/// stream ends after a `complete` or `error` event. Disconnecting stops
/// generation.
#[utoipa::path(
    post,
    path = "/api/pipeline/execute-stage",
    request_body = StageRequestPayload,
    responses(
        (status = 200, description = "Stream of progress events", content_type = "text/event-stream", body = ProgressEvent),
        (status = 400, description = "Malformed request body", body = crate::error::ErrorResponse)
    ),
    tag = "pipeline"
)]
pub async fn execute_stage(
    State(state): State<AppState>,
    payload: Result<Json<StageRequestPayload>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Json(payload) = payload?;

    let label = payload
        .task_id
        .clone()
        .unwrap_or_else(|| "unidentified".to_string());
    debug!(task_id = %label, "Opening stage progress stream");

    let (channel, receiver) = EventChannel::open(label);
    let executor = state.executor.clone();
    tokio::spawn(async move {
        let _ = executor.execute(payload, channel).await;
    });

    let stream = UnboundedReceiverStream::new(receiver).map(|event| progress_to_sse_event(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE_INTERVAL)))
}
