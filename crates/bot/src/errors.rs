use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/// Errors returned by the webhook endpoints.
pub enum AppError {
    /// The secret-token header is missing or wrong.
    Unauthorized,
    /// The body is not a Telegram update.
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Unauthorized => {
                warn!("Rejected webhook call with an invalid secret token");
                (StatusCode::UNAUTHORIZED, "Invalid secret token.".to_string())
            }
            AppError::BadRequest(message) => {
                warn!("Rejected malformed webhook payload: {message}");
                (StatusCode::BAD_REQUEST, message)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
