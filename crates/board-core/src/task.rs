use crate::error::{BoardError, Result};
use crate::types::{Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Story points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::ToDo,
            priority: Priority::default(),
            effort: None,
            assignee: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Fields a caller may set when creating or editing a task. `None` leaves the
/// field untouched; an empty assignee string clears the assignee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub effort: Option<u32>,
    pub assignee: Option<String>,
}

// ---------------------------------------------------------------------------
// Task list operations (operate on a mutable Vec<Task>)
// ---------------------------------------------------------------------------

/// Append a task and return its id.
///
/// Ids are `T<n>`. `next_seq` is the number the next id gets; it only moves
/// forward, so a removed id is never issued again. A zero (or stale) counter
/// is raised past the highest id already in the list.
pub fn add_task(
    tasks: &mut Vec<Task>,
    next_seq: &mut u32,
    title: impl Into<String>,
) -> Result<String> {
    let title = title.into();
    if title.trim().is_empty() {
        return Err(BoardError::EmptyTitle);
    }
    let n = (*next_seq).max(highest_number(tasks) + 1);
    *next_seq = n + 1;
    let id = format!("T{n}");
    tasks.push(Task::new(id.clone(), title.trim()));
    Ok(id)
}

pub fn move_task(tasks: &mut [Task], id: &str, status: TaskStatus) -> Result<()> {
    let task = find_mut(tasks, id)?;
    task.status = status;
    task.touch();
    Ok(())
}

pub fn assign_task(tasks: &mut [Task], id: &str, assignee: Option<&str>) -> Result<()> {
    let task = find_mut(tasks, id)?;
    task.assignee = assignee
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);
    task.touch();
    Ok(())
}

pub fn apply_patch(tasks: &mut [Task], id: &str, patch: TaskPatch) -> Result<()> {
    let task = find_mut(tasks, id)?;
    if let Some(title) = patch.title {
        if title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        task.title = title.trim().to_string();
    }
    if let Some(description) = patch.description {
        task.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(effort) = patch.effort {
        task.effort = Some(effort);
    }
    if let Some(assignee) = patch.assignee {
        task.assignee = Some(assignee.trim().to_string()).filter(|a| !a.is_empty());
    }
    task.touch();
    Ok(())
}

pub fn remove_task(tasks: &mut Vec<Task>, id: &str) -> Result<Task> {
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))?;
    Ok(tasks.remove(idx))
}

pub fn find<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
}

/// Human-readable summary: "2/5 done, 1 in progress, 2 to do"
pub fn summarize(tasks: &[Task]) -> String {
    let total = tasks.len();
    let count = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();
    format!(
        "{}/{total} done, {} in progress, {} to do",
        count(TaskStatus::Done),
        count(TaskStatus::InProgress),
        count(TaskStatus::ToDo)
    )
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
}

fn highest_number(tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix('T')?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_moves_across_columns() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        let id = add_task(&mut tasks, &mut seq, "Write tests").unwrap();
        assert_eq!(tasks[0].status, TaskStatus::ToDo);

        move_task(&mut tasks, &id, TaskStatus::InProgress).unwrap();
        assert_eq!(tasks[0].status, TaskStatus::InProgress);

        move_task(&mut tasks, &id, TaskStatus::Done).unwrap();
        assert_eq!(tasks[0].status, TaskStatus::Done);
        assert!(tasks[0].updated_at >= tasks[0].created_at);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        assert!(matches!(
            add_task(&mut tasks, &mut seq, "   "),
            Err(BoardError::EmptyTitle)
        ));
        assert!(tasks.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        add_task(&mut tasks, &mut seq, "First").unwrap();
        let second = add_task(&mut tasks, &mut seq, "Second").unwrap();
        remove_task(&mut tasks, &second).unwrap();
        let third = add_task(&mut tasks, &mut seq, "Third").unwrap();
        assert_eq!(third, "T3");
        assert_eq!(seq, 4);
    }

    #[test]
    fn unset_counter_starts_past_existing_ids() {
        let mut tasks = vec![Task::new("T1", "Legacy"), Task::new("T7", "Imported")];
        let mut seq = 0;
        assert_eq!(add_task(&mut tasks, &mut seq, "Next").unwrap(), "T8");

        // A stale counter never hands out an id that is still in use.
        let mut stale = 2;
        assert_eq!(add_task(&mut tasks, &mut stale, "Again").unwrap(), "T9");
    }

    #[test]
    fn assign_blank_clears_assignee() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        let id = add_task(&mut tasks, &mut seq, "Deploy").unwrap();
        assign_task(&mut tasks, &id, Some("ada")).unwrap();
        assert_eq!(tasks[0].assignee.as_deref(), Some("ada"));
        assign_task(&mut tasks, &id, Some("  ")).unwrap();
        assert_eq!(tasks[0].assignee, None);
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        let id = add_task(&mut tasks, &mut seq, "Deploy").unwrap();
        apply_patch(
            &mut tasks,
            &id,
            TaskPatch {
                priority: Some(Priority::Critical),
                effort: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(tasks[0].title, "Deploy");
        assert_eq!(tasks[0].priority, Priority::Critical);
        assert_eq!(tasks[0].effort, Some(5));
        assert_eq!(tasks[0].status, TaskStatus::ToDo);
    }

    #[test]
    fn task_not_found() {
        let mut tasks: Vec<Task> = Vec::new();
        assert!(move_task(&mut tasks, "T99", TaskStatus::Done).is_err());
        assert!(remove_task(&mut tasks, "T99").is_err());
    }

    #[test]
    fn summary_counts_columns() {
        let mut tasks: Vec<Task> = Vec::new();
        let mut seq = 0;
        let a = add_task(&mut tasks, &mut seq, "A").unwrap();
        add_task(&mut tasks, &mut seq, "B").unwrap();
        let c = add_task(&mut tasks, &mut seq, "C").unwrap();
        move_task(&mut tasks, &a, TaskStatus::Done).unwrap();
        move_task(&mut tasks, &c, TaskStatus::InProgress).unwrap();
        assert_eq!(summarize(&tasks), "1/3 done, 1 in progress, 1 to do");
    }
}
