//! Route table and static frontend serving.
//!
//! API routes nest under `/api`; the browser frontend is served from a
//! configured directory when present, with a descriptive fallback page
//! otherwise.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Upload body cap (multipart overhead included).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the full application router.
pub fn app_router(ctx: ApiContext, frontend_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/predict", post(endpoints::predict::predict))
        .route("/health", get(endpoints::health::check))
        .route("/patient/:name/history", get(endpoints::patients::history))
        .route("/patient/:name", get(endpoints::patients::latest))
        .route("/patient", post(endpoints::patients::create))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(ctx);

    let app = Router::new().nest("/api", api);

    match frontend_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "serving frontend");
            app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => {
            tracing::warn!("frontend directory not found, '/' will return a placeholder page");
            app.route("/", get(frontend_missing))
        }
    }
}

async fn frontend_missing() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::NOT_FOUND,
        Html(
            "<h1>Frontend not available</h1>\
             <p>Make sure the Frontend folder is present next to the project root, \
             or set FRONTEND_DIR.</p>",
        ),
    )
}
