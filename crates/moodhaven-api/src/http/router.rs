//! Axum router configuration with middleware.
//!
//! REST routes live under `/api/`; the realtime relay is at `/ws`.
//! Middleware: CORS, tracing.
//!
//! In production, the built React SPA is served from `apps/web/dist/`
//! (configurable via `MOODHAVEN_WEB_DIR`). API routes take priority;
//! unknown paths fall through to the SPA's `index.html` for client-side
//! routing. If the directory does not exist, only the API is served.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Mood tracking
        .route("/mood", post(handlers::mood::create_mood))
        .route("/mood/history", get(handlers::mood::mood_history))
        .route("/mood/today", get(handlers::mood::mood_today))
        // Achievements
        .route(
            "/achievements",
            get(handlers::achievement::list_achievements),
        )
        // Counselor chat sessions
        .route("/chat/session", post(handlers::chat::create_session))
        .route(
            "/chat/session/{id}/end",
            post(handlers::chat::end_session),
        )
        .route(
            "/chat/messages/{session_id}",
            get(handlers::chat::get_messages),
        );

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built React SPA from disk if the directory exists.
    // API routes, /ws, and /health take priority; unknown paths fall
    // through to index.html for client-side routing.
    let web_dir =
        std::env::var("MOODHAVEN_WEB_DIR").unwrap_or_else(|_| "apps/web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{}/index.html", web_dir);
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
