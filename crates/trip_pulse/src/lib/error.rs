use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Pipeline level failures. Each one terminates the request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing required parameters: {}", .missing.join(", "))]
    InvalidRequest { missing: Vec<&'static str> },
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Could not find any relevant video data.")]
    NoEvidenceFound { videos_seen: usize },
    #[error("Video search failed: {0}")]
    SearchFailed(String),
    #[error("Failed to generate itinerary: {0}")]
    GenerationFailed(String),
    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest { .. } | Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::NoEvidenceFound { .. } => StatusCode::NOT_FOUND,
            Error::SearchFailed(_) | Error::GenerationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Error::SearchFailed(detail) | Error::GenerationFailed(detail) => Some(detail.clone()),
            Error::DeadlineExceeded(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match (&self, self.details()) {
            (Error::SearchFailed(_), Some(details)) => {
                serde_json::json!({ "error": "Failed to search for travel videos.", "details": details })
            }
            (Error::GenerationFailed(_), Some(details)) => {
                serde_json::json!({ "error": "Failed to generate itinerary.", "details": details })
            }
            (Error::DeadlineExceeded(_), Some(details)) => {
                serde_json::json!({ "error": "Timed out generating itinerary.", "details": details })
            }
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
