use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use board_core::config::{Config, ModelConfig};
use report_flow::{
    FlowOptions, FlowRunner, HttpModelClient, ModelClient, ModelError,
    ModelRequest, ModelResponse, Report, ReportSlot, RiskReport, Retrospective,
    ScopeCreepReport, SprintPlan,
};

// ---------------------------------------------------------------------------
// Report slots
// ---------------------------------------------------------------------------

/// Latest stored result for each generator. Lives for the process lifetime.
#[derive(Debug, Default)]
pub struct ReportSlots {
    pub sprint_plan: ReportSlot<Report<SprintPlan>>,
    pub scope_creep: ReportSlot<Report<ScopeCreepReport>>,
    pub risk: ReportSlot<Report<RiskReport>>,
    pub retrospective: ReportSlot<Report<Retrospective>>,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub runner: FlowRunner,
    pub reports: Arc<ReportSlots>,
}

impl AppState {
    pub fn new(root: PathBuf, runner: FlowRunner) -> Self {
        Self {
            root,
            runner,
            reports: Arc::new(ReportSlots::default()),
        }
    }

    /// Build state from `.board/config.yaml`. A board without config or API
    /// key still serves the task endpoints; report submissions then fail
    /// with an upstream error naming the missing setting.
    pub fn from_root(root: PathBuf) -> Self {
        let model = match Config::load(&root) {
            Ok(config) => config.model,
            Err(e) => {
                tracing::warn!(error = %e, "using default model settings");
                ModelConfig::default()
            }
        };
        let options = FlowOptions::from(&model);
        let runner = match HttpModelClient::from_config(&model) {
            Ok(client) => FlowRunner::new(Arc::new(client), options),
            Err(e) => {
                tracing::warn!(error = %e, "report generation disabled");
                FlowRunner::new(Arc::new(Unconfigured(e.to_string())), options)
            }
        };
        Self::new(root, runner)
    }
}

/// Stands in for the HTTP client when it could not be built.
struct Unconfigured(String);

#[async_trait]
impl ModelClient for Unconfigured {
    async fn generate(&self, _request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        Err(ModelError::Config(self.0.clone()))
    }
}
