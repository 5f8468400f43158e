use async_trait::async_trait;
use serde::Serialize;

use crate::error::ModelError;
use crate::types::TokenUsage;

// ─── ModelRequest ─────────────────────────────────────────────────────────

/// One structured call to a hosted model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Name under which the output schema is declared (also the tool name).
    pub schema_name: &'static str,
    pub schema_description: &'static str,
    /// JSON Schema the model's output object must conform to.
    pub output_schema: serde_json::Value,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

// ─── ModelResponse ────────────────────────────────────────────────────────

/// What came back, before any schema validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelResponse {
    /// The structured output object, or `None` if the model produced none.
    pub output: Option<serde_json::Value>,
    /// Free text the model emitted alongside (or instead of) the object.
    pub text: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    pub fn with_output(output: serde_json::Value) -> Self {
        Self {
            output: Some(output),
            ..Default::default()
        }
    }
}

// ─── ModelClient ──────────────────────────────────────────────────────────

/// The single integration point with a hosted language model.
///
/// Implementations perform exactly one request per call: no retries, no
/// caching and no de-duplication of concurrent calls.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
}
