pub mod config;
pub mod projects;
pub mod reports;
pub mod session;
pub mod tasks;

use axum::Json;
use report_flow::ReportKind;

/// GET /api: service name, version and the report kinds it accepts.
pub async fn index() -> Json<serde_json::Value> {
    let kinds: Vec<_> = ReportKind::all().iter().map(|k| k.as_str()).collect();
    Json(serde_json::json!({
        "service": "board",
        "version": env!("CARGO_PKG_VERSION"),
        "reports": kinds,
    }))
}
