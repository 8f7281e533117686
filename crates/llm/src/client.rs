use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client, Response};
use tracing::{debug, error, info, warn};

use crate::error::{LlmError, LlmResult};
use crate::generator::{GenerationRequest, TextGenerator, TextStream};
use crate::types::*;

const DEFAULT_MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60000;

/// Streaming chat-completions client for the OpenRouter API
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    initial_backoff_ms: u64,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            initial_backoff_ms: INITIAL_BACKOFF_MS,
        }
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn with_retry<T, F, Fut>(&self, operation: F, operation_name: &str) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        let mut retries = 0;
        let mut backoff_ms = self.initial_backoff_ms;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(LlmError::RateLimited { retry_after }) => {
                    if retries >= DEFAULT_MAX_RETRIES {
                        error!(
                            "{} failed after {} retries due to rate limiting",
                            operation_name, retries
                        );
                        return Err(LlmError::RateLimited { retry_after });
                    }

                    let wait_ms = retry_after
                        .map(|s| s * 1000)
                        .unwrap_or(backoff_ms)
                        .min(MAX_BACKOFF_MS);

                    warn!(
                        "{} rate limited, retrying in {}ms (attempt {}/{})",
                        operation_name,
                        wait_ms,
                        retries + 1,
                        DEFAULT_MAX_RETRIES
                    );

                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    retries += 1;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
                Err(LlmError::Api {
                    ref message,
                    status_code: Some(code),
                }) if code >= 500 => {
                    if retries >= DEFAULT_MAX_RETRIES {
                        error!(
                            "{} failed after {} retries due to server error: {}",
                            operation_name, retries, message
                        );
                        return Err(LlmError::Api {
                            message: message.clone(),
                            status_code: Some(code),
                        });
                    }

                    warn!(
                        "{} server error ({}), retrying in {}ms (attempt {}/{})",
                        operation_name,
                        code,
                        backoff_ms,
                        retries + 1,
                        DEFAULT_MAX_RETRIES
                    );

                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => {
                    if retries > 0 {
                        info!("{} failed after {} retries: {}", operation_name, retries, e);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Open a streaming chat completion.
    ///
    /// Retries on rate limiting and 5xx while the stream is being opened; once
    /// content flows, errors are yielded from the stream as-is.
    pub async fn stream_chat(&self, messages: Vec<ChatMessage>) -> LlmResult<TextStream> {
        self.with_retry(
            || async { self.stream_chat_inner(messages.clone()).await },
            "stream_chat",
        )
        .await
    }

    async fn stream_chat_inner(&self, messages: Vec<ChatMessage>) -> LlmResult<TextStream> {
        debug!(
            "Creating streaming chat completion with {} messages, model {}",
            messages.len(),
            self.model
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: None,
            max_tokens: None,
            stream: Some(true),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?;

        let events = response
            .bytes_stream()
            .map(|r| r.map_err(std::io::Error::other))
            .eventsource()
            .boxed();

        // Yields content until `[DONE]`. A provider error chunk, a transport
        // error or a body that ends early terminates the stream with an error.
        let content_stream = futures::stream::unfold(Some(events), |state| async move {
            let Some(mut events) = state else {
                return None;
            };
            loop {
                let event = match events.next().await {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => return Some((Err(LlmError::Stream(e.to_string())), None)),
                    None => {
                        warn!("OpenRouter stream ended without [DONE]");
                        return Some((
                            Err(LlmError::Stream(
                                "Stream ended before completion".to_string(),
                            )),
                            None,
                        ));
                    }
                };

                let data = event.data.trim();
                if data == "[DONE]" {
                    return None;
                }
                if data.is_empty() {
                    continue;
                }

                match parse_chunk(data) {
                    Ok(Some(content)) => return Some((Ok(content), Some(events))),
                    Ok(None) => continue,
                    Err(e) => {
                        error!("OpenRouter stream failed: {}", e);
                        return Some((Err(e), None));
                    }
                }
            }
        });

        Ok(content_stream.boxed())
    }
}

/// Content carried by one SSE chunk, or the failure it reports.
fn parse_chunk(data: &str) -> LlmResult<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)?;

    if let Some(error) = chunk.error {
        warn!(code = ?error.code, "OpenRouter reported a mid-stream error");
        return Err(LlmError::Stream(error.message));
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(None);
    };
    if choice.finish_reason.as_deref() == Some("error") {
        return Err(LlmError::Stream(
            "Provider finished the generation with an error".to_string(),
        ));
    }

    Ok(choice.delta.content.filter(|content| !content.is_empty()))
}

async fn check_status(response: Response) -> LlmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 {
        warn!("Rate limited by OpenRouter");
        return Err(LlmError::RateLimited { retry_after: None });
    }

    if let Ok(error_resp) = serde_json::from_str::<OpenRouterError>(&error_text) {
        error!(
            "OpenRouter API error: {} (type: {:?})",
            error_resp.error.message, error_resp.error.error_type
        );
        return Err(LlmError::Api {
            message: error_resp.error.message,
            status_code: Some(status.as_u16()),
        });
    }

    Err(LlmError::Api {
        message: error_text,
        status_code: Some(status.as_u16()),
    })
}

#[async_trait]
impl TextGenerator for OpenRouterClient {
    async fn stream_text(&self, request: GenerationRequest) -> LlmResult<TextStream> {
        self.stream_chat(vec![
            ChatMessage::system(request.system_instruction),
            ChatMessage::user(request.prompt),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(tokens: &[&str]) -> String {
        let mut body = String::new();
        for token in tokens {
            let chunk = serde_json::json!({
                "id": "gen-1",
                "choices": [{"index": 0, "delta": {"content": token}, "finish_reason": null}]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn streaming(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_string(body)
    }

    async fn collect(stream: TextStream) -> Vec<LlmResult<String>> {
        stream.collect().await
    }

    fn client_for(server: &MockServer) -> OpenRouterClient {
        OpenRouterClient::new(
            "test-key".to_string(),
            server.uri(),
            "test/model".to_string(),
        )
        .with_initial_backoff(Duration::from_millis(10))
    }

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new(
            "test-key".to_string(),
            "https://openrouter.ai/api/v1/".to_string(),
            "test/model".to_string(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(client.model(), "test/model");
    }

    #[tokio::test]
    async fn test_stream_yields_tokens_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test/model",
                "stream": true,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "say hi"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["Hel", "lo", " world"])),
            )
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("be brief", "say hi"))
            .await
            .unwrap();
        let tokens: Vec<String> = stream.try_collect().await.unwrap();

        assert_eq!(tokens, vec!["Hel", "lo", " world"]);
    }

    #[tokio::test]
    async fn test_provider_error_chunk_ends_stream_with_error() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\n\ndata: {}\n\ndata: [DONE]\n\n",
            serde_json::json!({
                "choices": [{"index": 0, "delta": {"content": "# Partial"}, "finish_reason": null}]
            }),
            serde_json::json!({
                "error": {"code": 502, "message": "Provider disconnected"},
                "choices": [{"index": 0, "delta": {"content": ""}, "finish_reason": "error"}]
            }),
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(streaming(body))
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await
            .unwrap();
        let items = collect(stream).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "# Partial");
        match &items[1] {
            Err(LlmError::Stream(message)) => assert_eq!(message, "Provider disconnected"),
            other => panic!("expected a stream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_finish_reason_fails_stream() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\n\ndata: [DONE]\n\n",
            serde_json::json!({
                "choices": [{"index": 0, "delta": {"content": "half"}, "finish_reason": "error"}]
            }),
        );
        Mock::given(method("POST"))
            .respond_with(streaming(body))
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await
            .unwrap();
        let items = collect(stream).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::Stream(_))));
    }

    #[tokio::test]
    async fn test_body_without_done_is_a_stream_error() {
        let server = MockServer::start().await;
        let body = sse_body(&["Hel", "lo"]).replace("data: [DONE]\n\n", "");
        Mock::given(method("POST"))
            .respond_with(streaming(body))
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await
            .unwrap();
        let items = collect(stream).await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_deref().unwrap(), "lo");
        assert!(matches!(items[2], Err(LlmError::Stream(_))));
    }

    #[tokio::test]
    async fn test_malformed_chunk_fails_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(streaming("data: {not json}\n\ndata: [DONE]\n\n".to_string()))
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await
            .unwrap();
        let items = collect(stream).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "No auth credentials found", "code": 401}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await;

        match result {
            Err(LlmError::Api {
                message,
                status_code,
            }) => {
                assert_eq!(message, "No auth credentials found");
                assert_eq!(status_code, Some(401));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["ok"])),
            )
            .mount(&server)
            .await;

        let stream = client_for(&server)
            .stream_text(GenerationRequest::new("s", "p"))
            .await
            .unwrap();
        let tokens: Vec<String> = stream.try_collect().await.unwrap();
        assert_eq!(tokens, vec!["ok"]);
    }
}
