use std::sync::Arc;
use std::time::Instant;

use board_core::config::ModelConfig;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::FlowError;
use crate::model::{ModelClient, ModelRequest};
use crate::types::TokenUsage;

const SYSTEM_PROMPT: &str = "You are an assistant embedded in a Kanban project board. \
Answer only by calling the provided tool with an object that matches its schema exactly. \
Keep enumerated fields to the listed values and reproduce any headings you are asked for verbatim.";

// ─── ReportFlow ───────────────────────────────────────────────────────────

/// A structured-prompt flow: input schema, prompt template, output schema
/// and the structural checks the output must pass.
///
/// Implementations are stateless marker types; [`FlowRunner::run`] drives
/// them through validate → render → invoke → parse → finalize.
pub trait ReportFlow: Send + Sync + 'static {
    /// Stable identifier, also used as the declared output schema name.
    const NAME: &'static str;
    /// One-line description sent alongside the output schema.
    const DESCRIPTION: &'static str;

    type Input: Send + Sync;
    /// Validated, normalized form of the input the template renders from.
    type Validated: Send + Sync;
    type Output: DeserializeOwned + Serialize + Send + Sync;

    fn validate(input: &Self::Input) -> Result<Self::Validated, FlowError>;

    fn render(validated: &Self::Validated) -> String;

    fn output_schema() -> serde_json::Value;

    /// Check structural markers and apply deterministic adjustments derived
    /// from the input. The default accepts the output unchanged.
    fn finalize(
        _validated: &Self::Validated,
        output: Self::Output,
    ) -> Result<Self::Output, FlowError> {
        Ok(output)
    }
}

// ─── FlowOptions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&ModelConfig> for FlowOptions {
    fn from(model: &ModelConfig) -> Self {
        Self {
            temperature: model.temperature,
            max_tokens: model.max_tokens,
        }
    }
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 4096,
        }
    }
}

// ─── Report ───────────────────────────────────────────────────────────────

/// A successful flow result: the validated output plus call metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub run_id: Uuid,
    pub flow: &'static str,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub output: T,
}

// ─── FlowRunner ───────────────────────────────────────────────────────────

/// Runs any [`ReportFlow`] against a [`ModelClient`].
#[derive(Clone)]
pub struct FlowRunner {
    client: Arc<dyn ModelClient>,
    options: FlowOptions,
}

impl FlowRunner {
    pub fn new(client: Arc<dyn ModelClient>, options: FlowOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    /// Validate `input`, render the prompt, invoke the model once and parse
    /// its output. Every failure is terminal; nothing is retried and no
    /// partially populated output is ever returned.
    pub async fn run<F: ReportFlow>(&self, input: &F::Input) -> Result<Report<F::Output>, FlowError> {
        let validated = F::validate(input)?;
        let request = self.request::<F>(&validated);
        let run_id = Uuid::new_v4();
        tracing::debug!(flow = F::NAME, %run_id, prompt_bytes = request.prompt.len(), "invoking model");

        let started = Instant::now();
        let response = self.client.generate(&request).await.map_err(|e| {
            tracing::warn!(flow = F::NAME, %run_id, error = %e, "model call failed");
            FlowError::from(e)
        })?;

        let value = response
            .output
            .filter(|v| !v.is_null())
            .ok_or(FlowError::EmptyResponse { flow: F::NAME })?;

        let output: F::Output =
            serde_json::from_value(value).map_err(|e| FlowError::InvalidOutput {
                flow: F::NAME,
                reason: e.to_string(),
            })?;
        let output = F::finalize(&validated, output)?;

        tracing::info!(
            flow = F::NAME,
            %run_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            input_tokens = response.usage.as_ref().map(|u| u.input_tokens),
            output_tokens = response.usage.as_ref().map(|u| u.output_tokens),
            "report generated"
        );

        Ok(Report {
            run_id,
            flow: F::NAME,
            model: response.model,
            generated_at: Utc::now(),
            usage: response.usage,
            output,
        })
    }

    /// Validate and render without calling the model.
    pub fn preview<F: ReportFlow>(&self, input: &F::Input) -> Result<String, FlowError> {
        let validated = F::validate(input)?;
        Ok(F::render(&validated))
    }

    fn request<F: ReportFlow>(&self, validated: &F::Validated) -> ModelRequest {
        ModelRequest {
            schema_name: F::NAME,
            schema_description: F::DESCRIPTION,
            output_schema: F::output_schema(),
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: F::render(validated),
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        }
    }
}
