use serde::Serialize;
use thiserror::Error;

// ─── ModelError ───────────────────────────────────────────────────────────

/// Failure reported by a [`crate::ModelClient`] before any output parsing.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider answered with a non-success HTTP status.
    #[error("model provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never completed (connect failure, timeout, reset).
    #[error("model transport error: {0}")]
    Transport(String),

    /// The provider answered 2xx but the envelope could not be decoded.
    #[error("could not decode model response: {0}")]
    Decode(String),

    #[error("model client misconfigured: {0}")]
    Config(String),
}

impl ModelError {
    /// True when the provider is overloaded or unreachable and the same
    /// request may succeed later.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ModelError::Status { status, .. } => {
                matches!(status, 429 | 502 | 503 | 504 | 529)
            }
            ModelError::Transport(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("503")
                    || msg.contains("overloaded")
                    || msg.contains("unavailable")
                    || msg.contains("timed out")
                    || msg.contains("connect")
            }
            ModelError::Decode(_) | ModelError::Config(_) => false,
        }
    }
}

// ─── FailureKind ──────────────────────────────────────────────────────────

/// Coarse classification of a failed flow, used to pick the user-facing
/// message and the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    InvalidOutput,
    ServiceUnavailable,
    EmptyResponse,
    FormatError,
    Upstream,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::InvalidOutput => "invalid_output",
            FailureKind::ServiceUnavailable => "service_unavailable",
            FailureKind::EmptyResponse => "empty_response",
            FailureKind::FormatError => "format_error",
            FailureKind::Upstream => "upstream",
        }
    }

    /// Short notification text for end users.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "Please fix the highlighted field and submit again.",
            FailureKind::InvalidOutput => {
                "The AI response did not match the expected report shape. No report was produced."
            }
            FailureKind::ServiceUnavailable => {
                "The AI service is busy or unreachable right now. Please try again in a moment."
            }
            FailureKind::EmptyResponse => {
                "The AI returned an empty response. No report was produced."
            }
            FailureKind::FormatError => {
                "The AI response was missing required report sections. The prompt template and model output have drifted apart."
            }
            FailureKind::Upstream => "The AI request failed. Please try again.",
        }
    }
}

// ─── FlowError ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FlowError {
    /// Rejected locally; nothing was sent upstream.
    #[error("{field}: {constraint}")]
    InvalidInput {
        field: &'static str,
        constraint: String,
    },

    /// The model returned an object that does not conform to the output schema.
    #[error("{flow} response failed schema validation: {reason}")]
    InvalidOutput { flow: &'static str, reason: String },

    #[error("model service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{flow} returned an empty response")]
    EmptyResponse { flow: &'static str },

    /// The output conformed to the schema but lacks a structural marker.
    #[error("{flow} response format error: {detail}")]
    Format { flow: &'static str, detail: String },

    #[error("model request failed: {0}")]
    Upstream(String),
}

impl FlowError {
    pub fn invalid_input(field: &'static str, constraint: impl Into<String>) -> Self {
        FlowError::InvalidInput {
            field,
            constraint: constraint.into(),
        }
    }

    pub fn format(flow: &'static str, detail: impl Into<String>) -> Self {
        FlowError::Format {
            flow,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FlowError::InvalidInput { .. } => FailureKind::InvalidInput,
            FlowError::InvalidOutput { .. } => FailureKind::InvalidOutput,
            FlowError::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            FlowError::EmptyResponse { .. } => FailureKind::EmptyResponse,
            FlowError::Format { .. } => FailureKind::FormatError,
            FlowError::Upstream(_) => FailureKind::Upstream,
        }
    }

    /// Field name for input validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FlowError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<ModelError> for FlowError {
    fn from(e: ModelError) -> Self {
        if e.is_unavailable() {
            FlowError::ServiceUnavailable(e.to_string())
        } else {
            FlowError::Upstream(e.to_string())
        }
    }
}
