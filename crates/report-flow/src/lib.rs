//! `report-flow`: typed structured-prompt flows for the board's AI reports.
//!
//! Each report generator is a [`ReportFlow`]: an input record, a validator,
//! a deterministic prompt template, an output schema and the structural
//! checks its output must pass. [`FlowRunner`] drives any flow through one
//! [`ModelClient`] call and turns the result into either a typed
//! [`Report`] or a [`FlowError`] with a [`FailureKind`].
//!
//! # Architecture
//!
//! ```text
//! F::Input
//!     │  F::validate      ← field-scoped InvalidInput, nothing sent upstream
//!     ▼
//! F::Validated
//!     │  F::render        ← conditional prompt sections
//!     ▼
//! ModelRequest ──► ModelClient::generate   (HttpModelClient or a test double)
//!     │
//!     ▼
//! ModelResponse
//!     │  serde parse      ← EmptyResponse / InvalidOutput
//!     │  F::finalize      ← FormatError, deterministic adjustments
//!     ▼
//! Report<F::Output> ──► ReportSlot (newest submission wins)
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use report_flow::{flows::sprint_plan::*, FlowOptions, FlowRunner, HttpModelClient};
//!
//! let client = HttpModelClient::new(opts)?;
//! let runner = FlowRunner::new(Arc::new(client), FlowOptions::default());
//! let report = runner
//!     .run::<SprintPlanFlow>(&SprintPlanInput {
//!         tasks_text: "Fix bug – High – 3".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", report.output.plan);
//! ```

pub mod client;
pub mod error;
pub mod flow;
pub mod flows;
pub mod kind;
pub mod model;
pub mod slot;
pub mod template;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{HttpClientOptions, HttpModelClient};
pub use error::{FailureKind, FlowError, ModelError};
pub use flow::{FlowOptions, FlowRunner, Report, ReportFlow};
pub use flows::retrospective::{Retrospective, RetrospectiveFlow, RetrospectiveInput};
pub use flows::risk::{RiskFlow, RiskInput, RiskLevel, RiskReport};
pub use flows::scope_creep::{CreepLevel, ScopeCreepFlow, ScopeCreepInput, ScopeCreepReport};
pub use flows::sprint_plan::{SprintPlan, SprintPlanFlow, SprintPlanInput};
pub use kind::ReportKind;
pub use model::{ModelClient, ModelRequest, ModelResponse};
pub use slot::{ReportSlot, Ticket};
pub use types::TokenUsage;
