use axum::extract::{Path, Query, State};
use axum::Json;
use board_core::import;
use board_core::session::Session;
use chrono::{DateTime, Utc};
use report_flow::{
    FlowRunner, Report, ReportFlow, ReportKind, ReportSlot, RetrospectiveFlow, RiskFlow,
    ScopeCreepFlow, SprintPlanFlow,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

fn parse_kind(kind: &str) -> Result<ReportKind, AppError> {
    kind.parse::<ReportKind>().map_err(AppError::bad_request)
}

// ---------------------------------------------------------------------------
// Import (form prefill from the active project)
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct ImportQuery {
    /// Tasks created at or before this instant form the scope-creep baseline.
    #[serde(default)]
    pub baseline: Option<DateTime<Utc>>,
}

/// GET /api/reports/{kind}/import: form fields derived from the active
/// project's tasks.
pub async fn import_tasks(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ImportQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let project = Session::load(&root)?.active(&root)?;
        let tasks = &project.tasks;
        let mut form = match kind {
            ReportKind::SprintPlan => {
                serde_json::json!({ "tasks_text": import::sprint_plan_tasks(tasks) })
            }
            ReportKind::ScopeCreep => {
                serde_json::to_value(import::scope_creep_tasks(tasks, query.baseline))?
            }
            ReportKind::Risk => {
                serde_json::json!({ "tasks_json": import::risk_tasks_json(tasks)? })
            }
            ReportKind::Retrospective => {
                serde_json::json!({ "tasks_json": import::retrospective_tasks_json(tasks)? })
            }
        };
        form["project"] = serde_json::Value::from(project.slug.clone());
        Ok::<_, board_core::BoardError>(form)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Run `F` on `body` and offer the result to `slot`. The response reports
/// whether the result was stored; a newer submission that finished first
/// keeps its place.
async fn submit<F>(
    runner: &FlowRunner,
    slot: &ReportSlot<Report<F::Output>>,
    body: serde_json::Value,
) -> Result<serde_json::Value, AppError>
where
    F: ReportFlow,
    F::Input: DeserializeOwned,
    F::Output: Clone,
{
    let input: F::Input = serde_json::from_value(body)
        .map_err(|e| AppError::bad_request(format!("invalid {} form: {e}", F::NAME)))?;

    let ticket = slot.begin();
    let report = runner.run::<F>(&input).await?;
    let stored = slot.publish(ticket, report.clone());
    if !stored {
        tracing::info!(flow = F::NAME, run_id = %report.run_id, "newer report already stored");
    }

    let mut json = serde_json::to_value(&report)?;
    json["stored"] = serde_json::Value::Bool(stored);
    Ok(json)
}

/// POST /api/reports/{kind}: validate the form, run the generator and
/// store the result.
pub async fn run_report(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let slots = &app.reports;
    let runner = &app.runner;
    let result = match parse_kind(&kind)? {
        ReportKind::SprintPlan => submit::<SprintPlanFlow>(runner, &slots.sprint_plan, body).await,
        ReportKind::ScopeCreep => submit::<ScopeCreepFlow>(runner, &slots.scope_creep, body).await,
        ReportKind::Risk => submit::<RiskFlow>(runner, &slots.risk, body).await,
        ReportKind::Retrospective => {
            submit::<RetrospectiveFlow>(runner, &slots.retrospective, body).await
        }
    }?;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Latest
// ---------------------------------------------------------------------------

fn latest_value<T: Clone + serde::Serialize>(
    slot: &ReportSlot<Report<T>>,
) -> Result<Option<serde_json::Value>, serde_json::Error> {
    slot.latest().map(|r| serde_json::to_value(&r)).transpose()
}

/// GET /api/reports/{kind}: the latest stored report, 404 if none yet.
pub async fn latest_report(
    State(app): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let slots = &app.reports;
    let latest = match kind {
        ReportKind::SprintPlan => latest_value(&slots.sprint_plan)?,
        ReportKind::ScopeCreep => latest_value(&slots.scope_creep)?,
        ReportKind::Risk => latest_value(&slots.risk)?,
        ReportKind::Retrospective => latest_value(&slots.retrospective)?,
    };

    latest
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no {kind} report has been generated yet")))
}
