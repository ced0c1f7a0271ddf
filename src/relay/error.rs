use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayFailure {
    #[error("Recipe URL is required")]
    MissingUrl,

    #[error("Failed to send recipe link")]
    Upstream { details: String, timestamp: String },
}

impl RelayFailure {
    pub fn upstream(err: impl std::fmt::Display, timestamp: String) -> Self {
        RelayFailure::Upstream {
            details: err.to_string(),
            timestamp,
        }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        let error = self.to_string();
        match self {
            RelayFailure::MissingUrl => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            RelayFailure::Upstream { details, timestamp } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": error,
                    "details": details,
                    "timestamp": timestamp,
                })),
            )
                .into_response(),
        }
    }
}
