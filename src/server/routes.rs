use super::{handlers, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub static_dir: Option<String>,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/download", get(handlers::download))
        .route("/health", get(handlers::health));

    if let Some(static_dir) = &options.static_dir {
        tracing::info!("Serving static files from {}", static_dir);
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
