//! Drives the generative-text stream and derives progress from its length.

use std::sync::Arc;
use std::time::Duration;

use events::EventChannel;
use futures::StreamExt;
use llm::{GenerationRequest, LlmError, LlmResult, TextGenerator, TextStream};
use stagecraft_core::{DeliverableKind, StageRequest};
use tracing::{debug, info};

use crate::error::{OrchestratorError, Result};
use crate::prompts::StagePrompts;

/// Percentage emitted when the stream opens.
pub const STREAM_START_PERCENT: u8 = 15;
/// Upper bound while streaming; the rest belongs to publishing and completion.
pub const STREAM_MAX_PERCENT: u8 = 85;
/// Accumulated length at which streaming progress reaches its full span.
const EXPECTED_LENGTH: usize = 4000;
const PROGRESS_STEP: u8 = 10;
const STATUS_INTERVAL: usize = 800;

const STREAMING_STEP: &str = "Generating content";

/// Per-execution state. Owned by exactly one [`StageExecutor`](crate::StageExecutor) call.
#[derive(Debug)]
pub struct ExecutionContext {
    pub request: StageRequest,
    pub deliverable: Option<DeliverableKind>,
    pub repository_url: Option<String>,
    content: String,
    length: usize,
    last_percent: u8,
    last_status_offset: usize,
    status_lines: &'static [&'static str],
    status_cursor: usize,
}

impl ExecutionContext {
    pub fn new(request: StageRequest) -> Self {
        let deliverable = request.deliverable();
        let status_lines = StagePrompts::status_lines(deliverable.as_ref());
        Self {
            request,
            deliverable,
            repository_url: None,
            content: String::new(),
            length: 0,
            last_percent: 0,
            last_status_offset: 0,
            status_lines,
            status_cursor: 0,
        }
    }

    /// Accumulated generated text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Accumulated length in characters.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    pub fn push(&mut self, chunk: &str) {
        self.content.push_str(chunk);
        self.length += chunk.chars().count();
    }

    pub fn record_percent(&mut self, percent: u8) {
        self.last_percent = self.last_percent.max(percent);
    }

    /// Streaming percentage for the current length: `15 + len/4000*70`, capped at 85.
    pub fn streaming_percent(&self) -> u8 {
        let span = usize::from(STREAM_MAX_PERCENT - STREAM_START_PERCENT);
        let percent = usize::from(STREAM_START_PERCENT) + self.length * span / EXPECTED_LENGTH;
        percent.min(usize::from(STREAM_MAX_PERCENT)) as u8
    }

    /// The percentage to emit now, if it moved by more than the debounce step.
    pub fn next_percent(&mut self) -> Option<u8> {
        let percent = self.streaming_percent();
        if percent > self.last_percent.saturating_add(PROGRESS_STEP) {
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// The next status line, once enough text has accumulated since the last one.
    ///
    /// Each line is used at most once; after the last one nothing more is returned.
    pub fn next_status(&mut self) -> Option<&'static str> {
        if self.length - self.last_status_offset <= STATUS_INTERVAL {
            return None;
        }
        let line = self.status_lines.get(self.status_cursor).copied()?;
        self.status_cursor += 1;
        self.last_status_offset = self.length;
        Some(line)
    }
}

/// Consumes a [`TextGenerator`] stream into an [`ExecutionContext`], emitting
/// debounced `Progress` and status `Thought` events.
pub struct ContentStreamer {
    generator: Arc<dyn TextGenerator>,
    idle_timeout: Option<Duration>,
}

impl ContentStreamer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            idle_timeout: None,
        }
    }

    /// Treat a gap longer than `timeout` between tokens as a stream failure.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub async fn run(
        &self,
        request: GenerationRequest,
        ctx: &mut ExecutionContext,
        channel: &mut EventChannel,
    ) -> Result<()> {
        let mut stream = self.generator.stream_text(request).await?;

        channel.progress(STREAM_START_PERCENT, STREAMING_STEP);
        ctx.record_percent(channel.last_percent());

        loop {
            let next = tokio::select! {
                biased;
                _ = channel.closed() => {
                    info!(task_id = %ctx.request.task_id, received = ctx.len(), "Receiver gone, stopping stream");
                    return Err(OrchestratorError::Cancelled);
                }
                next = next_token(&mut stream, self.idle_timeout) => next?,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            ctx.push(&chunk);

            if let Some(percent) = ctx.next_percent() {
                channel.progress(percent, STREAMING_STEP);
            }
            if let Some(status) = ctx.next_status() {
                channel.thought(status);
            }
        }

        debug!(
            task_id = %ctx.request.task_id,
            length = ctx.len(),
            "Generation stream finished"
        );
        Ok(())
    }
}

/// Next stream item, failing with [`LlmError::IdleTimeout`] once `idle_timeout` elapses.
async fn next_token(
    stream: &mut TextStream,
    idle_timeout: Option<Duration>,
) -> std::result::Result<Option<LlmResult<String>>, LlmError> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.next())
            .await
            .map_err(|_| LlmError::IdleTimeout(limit.as_secs())),
        None => Ok(stream.next().await),
    }
}
