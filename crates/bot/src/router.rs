use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// The path Telegram delivers updates to in webhook mode.
pub const WEBHOOK_PATH: &str = "/telegram/webhook";

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(WEBHOOK_PATH, post(handlers::telegram_webhook))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
