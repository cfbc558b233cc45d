use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use crate::responses::reply;

/// Every failure a handler can raise. All of them surface as a 400 envelope
/// carrying the display text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing some required fields")]
    MissingFields,
    #[error("Invalid emoji id.")]
    InvalidId,
    #[error("keywords must be a comma-separated string or a list of strings")]
    InvalidKeywords,
    #[error("{0}")]
    InvalidPayload(String),
    #[error("{0}")]
    Store(String),
    #[error("worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Store(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Request rejected: {}", self);
        reply(self.status(), self.to_string())
    }
}
