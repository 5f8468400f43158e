pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(routes::index))
        // Config
        .route("/api/config", get(routes::config::get_config))
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{slug}",
            get(routes::projects::get_project).delete(routes::projects::delete_project),
        )
        // Tasks
        .route(
            "/api/projects/{slug}/tasks",
            post(routes::tasks::add_task),
        )
        .route(
            "/api/projects/{slug}/tasks/{id}",
            axum::routing::patch(routes::tasks::update_task).delete(routes::tasks::remove_task),
        )
        // Session
        .route("/api/session", get(routes::session::get_session))
        .route("/api/session/login", post(routes::session::login))
        .route("/api/session/logout", post(routes::session::logout))
        .route(
            "/api/session/active-project",
            put(routes::session::set_active_project),
        )
        // Reports
        .route(
            "/api/reports/{kind}",
            get(routes::reports::latest_report).post(routes::reports::run_report),
        )
        .route(
            "/api/reports/{kind}/import",
            get(routes::reports::import_tasks),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the board API server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the board API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::from_root(root));

    tracing::info!("board API listening on http://localhost:{actual_port}/api");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
