use axum::extract::{Path, State};
use axum::Json;
use board_core::project::Project;
use board_core::task::{self, TaskPatch};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AddTaskBody {
    pub title: String,
    #[serde(flatten)]
    pub fields: TaskPatch,
}

/// POST /api/projects/{slug}/tasks: add a task. Optional fields
/// (description, status, priority, effort, assignee) are applied on creation.
pub async fn add_task(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<AddTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut project = Project::load(&root, &slug)?;
        let id = project.add_task(body.title)?;
        task::apply_patch(
            &mut project.tasks,
            &id,
            TaskPatch {
                title: None,
                ..body.fields
            },
        )?;
        project.save(&root)?;
        let created = task::find(&project.tasks, &id)?;
        Ok::<_, board_core::BoardError>(serde_json::to_value(created)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PATCH /api/projects/{slug}/tasks/{id}: edit, move or assign a task.
pub async fn update_task(
    State(app): State<AppState>,
    Path((slug, task_id)): Path<(String, String)>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut project = Project::load(&root, &slug)?;
        task::apply_patch(&mut project.tasks, &task_id, patch)?;
        project.save(&root)?;
        let updated = task::find(&project.tasks, &task_id)?;
        Ok::<_, board_core::BoardError>(serde_json::to_value(updated)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/projects/{slug}/tasks/{id}: remove a task.
pub async fn remove_task(
    State(app): State<AppState>,
    Path((slug, task_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut project = Project::load(&root, &slug)?;
        let removed = task::remove_task(&mut project.tasks, &task_id)?;
        project.save(&root)?;
        Ok::<_, board_core::BoardError>(serde_json::json!({
            "slug": slug,
            "task_id": removed.id,
            "removed": true,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
