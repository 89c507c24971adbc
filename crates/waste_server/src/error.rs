//! HTTP error mapping for handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use waste_core::AppError;

/// Handler error that renders as a short plain-text response.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_client_error() {
            tracing::debug!("Rejected request: {}", err);
        }

        let (status, message) = match err {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Invalid UUID".to_string()),
            AppError::TooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Content too big".to_string())
            }
            AppError::InvalidContent(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content not allowed".to_string(),
            ),
            AppError::Locked(msg) => (StatusCode::LOCKED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            other => {
                tracing::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error".to_string())
            }
        };

        (status, format!("{}\n", message)).into_response()
    }
}
