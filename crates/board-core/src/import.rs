//! Reshape a project's tasks into the text and JSON formats the report
//! generators accept, so a form can be prefilled from the active project.

use crate::error::Result;
use crate::task::Task;
use crate::types::TaskStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Separator used in one-line task descriptions ("Title – Priority – Points").
pub const FIELD_SEPARATOR: &str = " – ";

/// Compact task record embedded as JSON in risk and retrospective inputs.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<&'a str>,
    pub priority: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
}

impl<'a> From<&'a Task> for TaskRecord<'a> {
    fn from(t: &'a Task) -> Self {
        Self {
            id: &t.id,
            title: &t.title,
            status: t.status,
            assignee: t.assignee.as_deref(),
            priority: t.priority.as_str(),
            effort: t.effort,
        }
    }
}

/// Scope-creep form fields derived from a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeImport {
    pub current_tasks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_tasks: Option<String>,
}

/// `Title – Priority – Points`, with `?` for unestimated tasks.
pub fn plan_line(task: &Task) -> String {
    let points = task
        .effort
        .map(|e| e.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{}{sep}{}{sep}{points}",
        task.title,
        task.priority,
        sep = FIELD_SEPARATOR
    )
}

fn scope_line(task: &Task) -> String {
    format!("{}{FIELD_SEPARATOR}{}", task.title, task.priority)
}

/// Active (not done) tasks, one `Title – Priority – Points` line each.
pub fn sprint_plan_tasks(tasks: &[Task]) -> String {
    tasks
        .iter()
        .filter(|t| t.status.is_active())
        .map(plan_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every task as a `Title – Priority` line. When `baseline` is given, tasks
/// created at or before it also form the original (committed) list.
pub fn scope_creep_tasks(tasks: &[Task], baseline: Option<DateTime<Utc>>) -> ScopeImport {
    let current_tasks = tasks.iter().map(scope_line).collect::<Vec<_>>().join("\n");
    let original_tasks = baseline.map(|cutoff| {
        tasks
            .iter()
            .filter(|t| t.created_at <= cutoff)
            .map(scope_line)
            .collect::<Vec<_>>()
            .join("\n")
    });
    ScopeImport {
        current_tasks,
        original_tasks,
    }
}

/// Active tasks as a pretty-printed JSON array for the risk generator.
pub fn risk_tasks_json(tasks: &[Task]) -> Result<String> {
    let records: Vec<TaskRecord<'_>> = tasks
        .iter()
        .filter(|t| t.status.is_active())
        .map(TaskRecord::from)
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// All tasks as a pretty-printed JSON array for the retrospective generator.
pub fn retrospective_tasks_json(tasks: &[Task]) -> Result<String> {
    let records: Vec<TaskRecord<'_>> = tasks.iter().map(TaskRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
