use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use board_core::config::ModelConfig;
use reqwest::Client;

use crate::error::ModelError;
use crate::model::{ModelClient, ModelRequest, ModelResponse};
use crate::types::{
    ErrorEnvelope, InputMessage, MessagesRequest, MessagesResponse, ToolChoice, ToolDefinition,
};

const API_VERSION: &str = "2023-06-01";

// ─── HttpClientOptions ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpClientOptions {
    /// Provider base URL without the `/v1/messages` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl HttpClientOptions {
    /// Options for the board's configured provider. The key is read from the
    /// environment variable named by `api_key_env`; unset is a config error.
    pub fn from_config(model: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = model.api_key().ok_or_else(|| {
            ModelError::Config(format!(
                "environment variable {} is not set",
                model.api_key_env
            ))
        })?;
        Ok(Self {
            base_url: model.base_url.clone(),
            api_key,
            model: model.model.clone(),
            timeout: Duration::from_secs(model.timeout_secs),
        })
    }
}

impl fmt::Debug for HttpClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ─── HttpModelClient ──────────────────────────────────────────────────────

/// [`ModelClient`] for the Anthropic Messages API.
///
/// The output schema is sent as the input schema of a single tool and the
/// model is forced to call it, so the structured output arrives as that
/// tool call's `input` object. A plain-text JSON answer is accepted as a
/// fallback when no tool call is present.
#[derive(Clone)]
pub struct HttpModelClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpModelClient {
    pub fn new(opts: HttpClientOptions) -> Result<Self, ModelError> {
        if opts.api_key.trim().is_empty() {
            return Err(ModelError::Config("API key is empty".into()));
        }
        let http = Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| ModelError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/v1/messages", opts.base_url.trim_end_matches('/')),
            api_key: opts.api_key,
            model: opts.model,
        })
    }

    /// Client for the board's configured provider.
    pub fn from_config(model: &ModelConfig) -> Result<Self, ModelError> {
        Self::new(HttpClientOptions::from_config(model)?)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![InputMessage {
                role: "user",
                content: &request.prompt,
            }],
            tools: vec![ToolDefinition {
                name: request.schema_name,
                description: request.schema_description,
                input_schema: &request.output_schema,
            }],
            tool_choice: ToolChoice::Tool {
                name: request.schema_name,
            },
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            let body = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(env) => format!("{}: {}", env.error.kind, env.error.message),
                Err(_) => text,
            };
            tracing::warn!(status = status.as_u16(), "model provider returned an error");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        let text = envelope.text();
        let output = envelope
            .tool_input(request.schema_name)
            .cloned()
            .or_else(|| extract_json_object(&text));

        Ok(ModelResponse {
            output,
            text,
            model: envelope.model,
            usage: envelope.usage,
        })
    }
}

fn transport_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        ModelError::Transport(format!("could not connect: {e}"))
    } else {
        ModelError::Transport(e.to_string())
    }
}

/// Pull a JSON object out of free text, tolerating a Markdown code fence.
fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&text[start..=end])
        .ok()
        .filter(|v| v.is_object())
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            schema_name: "sprint_plan",
            schema_description: "Sprint plan report",
            output_schema: serde_json::json!({"type": "object"}),
            system: Some("You plan sprints.".into()),
            prompt: "Plan this sprint.".into(),
            temperature: 0.4,
            max_tokens: 512,
        }
    }

    fn client(base_url: String) -> HttpModelClient {
        HttpModelClient::new(HttpClientOptions {
            base_url,
            api_key: "test-key".into(),
            model: "claude-sonnet-4-5".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn options_come_from_board_config() {
        let model = ModelConfig {
            base_url: "http://localhost:9/".into(),
            timeout_secs: 7,
            api_key_env: "PATH".into(),
            ..ModelConfig::default()
        };
        let opts = HttpClientOptions::from_config(&model).unwrap();
        assert_eq!(opts.base_url, "http://localhost:9/");
        assert_eq!(opts.timeout, Duration::from_secs(7));
        assert!(!format!("{opts:?}").contains(&opts.api_key));

        let client = HttpModelClient::new(opts).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9/v1/messages");
        assert!(!format!("{client:?}").contains("api_key"));
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let model = ModelConfig {
            api_key_env: "BOARD_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..ModelConfig::default()
        };
        match HttpModelClient::from_config(&model) {
            Err(ModelError::Config(msg)) => {
                assert!(msg.contains("BOARD_TEST_KEY_THAT_IS_NEVER_SET"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_use_input_becomes_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", API_VERSION)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "temperature": 0.4,
                "tool_choice": {"type": "tool", "name": "sprint_plan"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r###"{
                    "id": "msg_1",
                    "model": "claude-sonnet-4-5",
                    "content": [{"type": "tool_use", "id": "tu", "name": "sprint_plan", "input": {"plan": "## Sprint Plan"}}],
                    "usage": {"input_tokens": 10, "output_tokens": 5}
                }"###,
            )
            .create_async()
            .await;

        let resp = client(server.url()).generate(&request()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(resp.output.unwrap()["plan"], "## Sprint Plan");
        assert_eq!(resp.model, "claude-sonnet-4-5");
        assert_eq!(resp.usage.unwrap().input_tokens, 10);
    }

    #[tokio::test]
    async fn text_json_is_accepted_as_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(
                r#"{"content": [{"type": "text", "text": "```json\n{\"plan\": \"x\"}\n```"}]}"#,
            )
            .create_async()
            .await;

        let resp = client(server.url()).generate(&request()).await.unwrap();
        assert_eq!(resp.output.unwrap()["plan"], "x");
    }

    #[tokio::test]
    async fn response_without_output_has_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content": []}"#)
            .create_async()
            .await;

        let resp = client(server.url()).generate(&request()).await.unwrap();
        assert!(resp.output.is_none());
    }

    #[tokio::test]
    async fn overloaded_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(
                r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#,
            )
            .create_async()
            .await;

        let err = client(server.url())
            .generate(&request())
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("overloaded_error: Overloaded"));
    }

    #[tokio::test]
    async fn bad_request_is_not_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(400)
            .with_body("nope")
            .create_async()
            .await;

        let err = client(server.url())
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Status { status: 400, .. }));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = HttpModelClient::new(HttpClientOptions {
            base_url: "http://localhost".into(),
            api_key: " ".into(),
            model: "m".into(),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(err, Err(ModelError::Config(_))));
    }

    #[test]
    fn extract_json_ignores_non_objects() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("[1, 2]").is_none());
        assert_eq!(
            extract_json_object("prefix {\"a\": 1} suffix").unwrap()["a"],
            1
        );
    }
}
