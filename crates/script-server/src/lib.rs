pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
///
/// Fails when the workspace config or the save store cannot be loaded.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::load(root)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        // Catalog
        .route("/api/generators", get(routes::generators::list_generators))
        .route(
            "/api/generator-specs",
            get(routes::generators::get_generator_specs),
        )
        // Rendering
        .route("/api/normalize", post(routes::render::normalize))
        .route("/api/render", post(routes::render::render))
        .route(
            "/api/objective-code",
            post(routes::render::objective_code),
        )
        // Save slots
        .route("/api/saves", get(routes::saves::list_saves))
        .route(
            "/api/saves/{name}",
            get(routes::saves::get_save)
                .put(routes::saves::put_save)
                .delete(routes::saves::delete_save),
        )
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

/// Start the web UI server on a pre-bound listener.
///
/// The caller binds first so it can report the actual port when `port = 0`.
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;

    tracing::info!("script-creator UI listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
