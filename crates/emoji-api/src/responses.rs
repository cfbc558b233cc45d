use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use emoji_types::api::Envelope;

/// JSON `{ "message": ... }` response with the given status.
pub fn reply<T: Serialize>(status: StatusCode, message: T) -> Response {
    (status, Json(Envelope::new(message))).into_response()
}
