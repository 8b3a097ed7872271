/// LLM Client — the single point of entry for all language model calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the AI gateway directly.
/// All LLM interactions MUST go through this module.
///
/// Speaks the OpenAI-compatible chat-completions protocol exposed by the gateway.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// First retry waits this long; each later retry doubles it.
const BACKOFF_BASE: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("AI usage quota exceeded")]
    QuotaExceeded,

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Text of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

/// How a non-success gateway status should be handled.
#[derive(Debug, PartialEq, Eq)]
enum StatusClass {
    /// 429 and 5xx: try again after backoff.
    Retry,
    /// 402: out of credits, retrying won't help.
    Quota,
    /// Anything else: surface immediately.
    Fatal,
}

fn classify_status(status: StatusCode) -> StatusClass {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusClass::Retry
    } else if status == StatusCode::PAYMENT_REQUIRED {
        StatusClass::Quota
    } else {
        StatusClass::Fatal
    }
}

/// The single LLM client used by the service.
/// Wraps the chat-completions API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
            model,
            backoff_base: BACKOFF_BASE,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the gateway, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                match classify_status(status) {
                    StatusClass::Retry => {
                        warn!("LLM gateway returned {}: {}", status, body);
                        last_error = Some(if status == StatusCode::TOO_MANY_REQUESTS {
                            LlmError::RateLimited {
                                retries: MAX_RETRIES,
                            }
                        } else {
                            LlmError::Api {
                                status: status.as_u16(),
                                message: body,
                            }
                        });
                        continue;
                    }
                    StatusClass::Quota => {
                        warn!("LLM gateway reported exhausted quota: {}", body);
                        return Err(LlmError::QuotaExceeded);
                    }
                    StatusClass::Fatal => {
                        let message = serde_json::from_str::<GatewayError>(&body)
                            .map(|e| e.error.message)
                            .unwrap_or(body);
                        return Err(LlmError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    }
                }
            }

            let llm_response: LlmResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system, temperature).await?;
        parse_json_text(&response)
    }
}

fn parse_json_text<T: DeserializeOwned>(response: &LlmResponse) -> Result<T, LlmError> {
    let text = response.text().ok_or(LlmError::EmptyContent)?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(text);

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Starts a local gateway that always answers with `status` and `body`,
    /// returning its URL and a hit counter.
    async fn spawn_gateway(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let status = axum::http::StatusCode::from_u16(status).unwrap();

        let app = axum::Router::new().route(
            "/v1/chat/completions",
            axum::routing::post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        status,
                        [(axum::http::header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1/chat/completions"), hits)
    }

    fn test_client(api_url: String) -> LlmClient {
        LlmClient {
            client: Client::builder().no_proxy().build().unwrap(),
            api_key: "test-key".to_string(),
            api_url,
            model: "test-model".to_string(),
            backoff_base: Duration::from_millis(1),
        }
    }

    fn response_with(content: Option<&str>) -> LlmResponse {
        serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        }))
        .unwrap()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), StatusClass::Retry);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), StatusClass::Retry);
        assert_eq!(classify_status(StatusCode::PAYMENT_REQUIRED), StatusClass::Quota);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), StatusClass::Fatal);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), StatusClass::Fatal);
    }

    #[test]
    fn test_response_text_reads_first_choice() {
        let response = response_with(Some("hello"));
        assert_eq!(response.text(), Some("hello"));
    }

    #[test]
    fn test_response_text_missing_or_blank_is_none() {
        assert_eq!(response_with(None).text(), None);
        assert_eq!(response_with(Some("  ")).text(), None);

        let empty: LlmResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_parse_json_text_strips_fences() {
        let response = response_with(Some("```json\n{\"n\": 3}\n```"));
        let value: serde_json::Value = parse_json_text(&response).unwrap();
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_parse_json_text_empty_content() {
        let response = response_with(None);
        let err = parse_json_text::<serde_json::Value>(&response).unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_parse_json_text_invalid_json() {
        let response = response_with(Some("not json at all"));
        let err = parse_json_text::<serde_json::Value>(&response).unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_call_rate_limited_retries_then_gives_up() {
        let (url, hits) = spawn_gateway(429, r#"{"error":{"message":"slow down"}}"#).await;
        let err = test_client(url).call("p", "s", 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retries: MAX_RETRIES }));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_call_payment_required_is_quota_without_retry() {
        let (url, hits) = spawn_gateway(402, r#"{"error":{"message":"out of credits"}}"#).await;
        let err = test_client(url).call("p", "s", 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::QuotaExceeded));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_server_error_retries_and_surfaces_last_error() {
        let (url, hits) = spawn_gateway(500, "boom").await;
        let err = test_client(url).call("p", "s", 0.3).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_call_client_error_unwraps_gateway_message() {
        let (url, hits) = spawn_gateway(401, r#"{"error":{"message":"invalid api key"}}"#).await;
        let err = test_client(url).call("p", "s", 0.3).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_json_success() {
        let (url, hits) = spawn_gateway(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"```json\n{\"ok\": true}\n```"}}],"usage":{"prompt_tokens":3,"completion_tokens":4}}"#,
        )
        .await;
        let value: serde_json::Value = test_client(url).call_json("p", "s", 0.3).await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
