//! LLM client: the only place that talks to the text-generation API.
//!
//! Handlers depend on the `TextGenerator` trait, carried in `AppState` as
//! `Arc<dyn TextGenerator>`, so the backend can be swapped or stubbed.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const RETRY_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("text generation is not configured (set ANTHROPIC_API_KEY)")]
    NotConfigured,
}

/// Sampling limits for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text, trimmed. Empty output is an error.
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API client with retry on 429 / 5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    retry_base: Duration,
}

/// Outcome of one HTTP round trip.
enum Attempt {
    Done(LlmResponse),
    Retry(LlmError),
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
            retry_base: RETRY_BASE,
        })
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>, retry_base: Duration) -> Self {
        self.endpoint = endpoint.into();
        self.retry_base = retry_base;
        self
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429, 5xx and transport errors, doubling the delay each time.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        params: GenerationParams,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base * (1 << (attempt - 1));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying LLM call"
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&request_body).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retry(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    async fn send_once(&self, body: &AnthropicRequest<'_>) -> Result<Attempt, LlmError> {
        let response = match self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Ok(Attempt::Retry(LlmError::Http(e))),
        };

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "LLM API error: {message}");
            return Ok(Attempt::Retry(LlmError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: LlmResponse = response.json().await?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "LLM call succeeded"
        );
        Ok(Attempt::Done(parsed))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, system, params).await?;
        non_empty_text(&response)
    }
}

fn non_empty_text(response: &LlmResponse) -> Result<String, LlmError> {
    response
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(LlmError::EmptyContent)
}

/// Stands in when no API key is configured; every call fails explicitly.
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(
        &self,
        _system: &str,
        _prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Router};

    const OK_BODY: &str = r#"{"content": [{"type": "text", "text": "Dear team"}], "usage": {"input_tokens": 3, "output_tokens": 2}}"#;

    const PARAMS: GenerationParams = GenerationParams {
        max_tokens: 10,
        temperature: 0.5,
    };

    /// Replies with the scripted (status, body) pairs in order, repeating the
    /// last one once the script runs out.
    #[derive(Clone)]
    struct Scripted {
        calls: Arc<AtomicUsize>,
        replies: Arc<Vec<(u16, &'static str)>>,
    }

    async fn scripted_reply(State(scripted): State<Scripted>) -> (StatusCode, &'static str) {
        let n = scripted.calls.fetch_add(1, Ordering::SeqCst);
        let (status, body) = scripted.replies[n.min(scripted.replies.len() - 1)];
        (StatusCode::from_u16(status).unwrap(), body)
    }

    async fn scripted_client(replies: Vec<(u16, &'static str)>) -> (LlmClient, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v1/messages", post(scripted_reply))
            .with_state(Scripted {
                calls: calls.clone(),
                replies: Arc::new(replies),
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_endpoint(format!("http://{addr}/v1/messages"), Duration::from_millis(5));
        (client, calls)
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_success() {
        let (client, calls) =
            scripted_client(vec![(500, "boom"), (503, "busy"), (200, OK_BODY)]).await;
        let text = client.generate("sys", "prompt", PARAMS).await.unwrap();
        assert_eq!(text, "Dear team");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_server_error_returns_last_error() {
        let (client, calls) = scripted_client(vec![(429, "slow down"), (503, "still busy")]).await;
        let err = client.call("prompt", "sys", PARAMS).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "still busy");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (client, calls) = scripted_client(vec![(
            400,
            r#"{"type": "error", "error": {"type": "invalid_request_error", "message": "max_tokens too large"}}"#,
        )])
        .await;
        let err = client.call("prompt", "sys", PARAMS).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "max_tokens too large");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn response(json: &str) -> LlmResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_picks_first_text_block() {
        let r = response(
            r#"{
                "content": [
                    {"type": "tool_use"},
                    {"type": "text", "text": "  Dear hiring team,\n\n"}
                ],
                "usage": {"input_tokens": 10, "output_tokens": 5}
            }"#,
        );
        assert_eq!(non_empty_text(&r).unwrap(), "Dear hiring team,");
    }

    #[test]
    fn test_blank_text_is_empty_content() {
        let r = response(
            r#"{"content": [{"type": "text", "text": "   "}], "usage": {"input_tokens": 1, "output_tokens": 0}}"#,
        );
        assert!(matches!(non_empty_text(&r), Err(LlmError::EmptyContent)));

        let r = response(r#"{"content": [], "usage": {"input_tokens": 1, "output_tokens": 0}}"#);
        assert!(matches!(non_empty_text(&r), Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_unconfigured_generator_fails() {
        let result = UnconfiguredGenerator.generate("sys", "prompt", PARAMS).await;
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }
}
