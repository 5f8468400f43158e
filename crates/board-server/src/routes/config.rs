use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config: read-only view of `.board/config.yaml` plus its
/// validation warnings.
///
/// The API key itself is never stored in config; only the name of the
/// environment variable that holds it is returned.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let config = board_core::config::Config::load(&root)?;
        let warnings = config.validate();
        let mut json = serde_json::to_value(&config)?;
        json["warnings"] = serde_json::to_value(&warnings)?;
        json["api_key_present"] = serde_json::Value::Bool(config.model.api_key().is_some());
        Ok::<_, board_core::BoardError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
