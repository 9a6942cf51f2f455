use crate::{dispatcher::ChatUpdate, errors::AppError, state::AppState, telegram::Update};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

/// The header Telegram uses to echo the webhook's secret token.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// The root handler.
pub async fn root() -> &'static str {
    "adwise bot is running."
}

/// The health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Receives one update from Telegram and queues it for its chat.
///
/// Answers as soon as the update is queued; replies go out through the Bot API.
pub async fn telegram_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    if let Some(expected) = &app_state.webhook_secret {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(AppError::Unauthorized);
        }
    }

    let update: Update =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    debug!(update_id = update.update_id, "Webhook update received");

    if let Some(chat_update) = ChatUpdate::from_update(update) {
        app_state.dispatcher.dispatch(chat_update);
    }
    Ok(StatusCode::OK)
}
