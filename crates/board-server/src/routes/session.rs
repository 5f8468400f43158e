use axum::extract::State;
use axum::Json;
use board_core::session::Session;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub user: String,
}

#[derive(serde::Deserialize)]
pub struct ActiveProjectBody {
    /// `null` clears the selection.
    pub slug: Option<String>,
}

/// GET /api/session: signed-in user and active project.
pub async fn get_session(State(app): State<AppState>) -> Result<Json<Session>, AppError> {
    let root = app.root.clone();
    let session = tokio::task::spawn_blocking(move || Session::load(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(session))
}

/// POST /api/session/login: mocked sign-in; no credentials are checked.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Session>, AppError> {
    if body.user.trim().is_empty() {
        return Err(AppError::bad_request("user must not be empty"));
    }
    let root = app.root.clone();
    let session = tokio::task::spawn_blocking(move || {
        let mut session = Session::load(&root)?;
        session.login(&body.user);
        session.save(&root)?;
        Ok::<_, board_core::BoardError>(session)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(user = ?session.user, "signed in");
    Ok(Json(session))
}

/// POST /api/session/logout: clear the user; the active project is kept.
pub async fn logout(State(app): State<AppState>) -> Result<Json<Session>, AppError> {
    let root = app.root.clone();
    let session = tokio::task::spawn_blocking(move || {
        let mut session = Session::load(&root)?;
        session.logout();
        session.save(&root)?;
        Ok::<_, board_core::BoardError>(session)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(session))
}

/// PUT /api/session/active-project: select (or clear) the active project.
pub async fn set_active_project(
    State(app): State<AppState>,
    Json(body): Json<ActiveProjectBody>,
) -> Result<Json<Session>, AppError> {
    let root = app.root.clone();
    let session = tokio::task::spawn_blocking(move || {
        let mut session = Session::load(&root)?;
        match body.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => session.set_active_project(&root, slug)?,
            None => session.clear_active_project(),
        }
        session.save(&root)?;
        Ok::<_, board_core::BoardError>(session)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(session))
}
