use axum::extract::{Path, State};
use axum::Json;
use board_core::project::Project;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateProjectBody {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn project_summary(p: &Project) -> serde_json::Value {
    serde_json::json!({
        "slug": p.slug,
        "name": p.name,
        "description": p.description,
        "created_at": p.created_at,
        "task_count": p.tasks.len(),
        "progress": board_core::task::summarize(&p.tasks),
    })
}

/// GET /api/projects: list projects, oldest first.
pub async fn list_projects(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let projects = Project::list(&root)?;
        let list: Vec<_> = projects.iter().map(project_summary).collect();
        Ok::<_, board_core::BoardError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/projects: create a project.
pub async fn create_project(
    State(app): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let project = Project::create(&root, body.slug, body.name, body.description)?;
        Ok::<_, board_core::BoardError>(project_summary(&project))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/projects/{slug}: project with its full task list.
pub async fn get_project(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let project = Project::load(&root, &slug)?;
        Ok::<_, board_core::BoardError>(serde_json::to_value(&project)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/projects/{slug}: delete a project. Clears the session's
/// active project if it pointed at the deleted one.
pub async fn delete_project(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        Project::delete(&root, &slug)?;
        let mut session = board_core::session::Session::load(&root)?;
        if session.active_project.as_deref() == Some(slug.as_str()) {
            session.clear_active_project();
            session.save(&root)?;
        }
        Ok::<_, board_core::BoardError>(serde_json::json!({ "slug": slug, "deleted": true }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
