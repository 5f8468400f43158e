//! The four report generators.

pub mod retrospective;
pub mod risk;
pub mod scope_creep;
pub mod sprint_plan;

use serde::de::DeserializeOwned;

use crate::error::FlowError;
use crate::template::present;

/// Parse a required JSON array of task records.
pub(crate) fn parse_task_array<T: DeserializeOwned>(
    field: &'static str,
    text: &str,
) -> Result<Vec<T>, FlowError> {
    let text = present(Some(text))
        .ok_or_else(|| FlowError::invalid_input(field, "task list must not be empty"))?;
    let tasks: Vec<T> = serde_json::from_str(text).map_err(|e| {
        FlowError::invalid_input(field, format!("must be a JSON array of task records: {e}"))
    })?;
    if tasks.is_empty() {
        return Err(FlowError::invalid_input(
            field,
            "task list must contain at least one task",
        ));
    }
    Ok(tasks)
}

/// Status strings that mean the task is finished.
pub(crate) fn is_done(status: &str) -> bool {
    matches!(
        status.trim().to_lowercase().as_str(),
        "done" | "completed" | "complete" | "closed"
    )
}

/// True if some line of `text` is exactly the Markdown `heading`, ignoring
/// surrounding whitespace.
pub(crate) fn has_heading(text: &str, heading: &str) -> bool {
    text.lines().any(|l| l.trim() == heading)
}

/// Trim an optional prose field, mapping blank to `None`.
pub(crate) fn tidy(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
