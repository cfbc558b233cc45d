use std::collections::HashMap;

use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;

/// Request body fields, from either a JSON object or a urlencoded form.
#[derive(Debug)]
pub struct Payload(pub Map<String, Value>);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Some(content_type) = req.headers().get(CONTENT_TYPE) else {
            return Self::from_untyped_body(req, state).await;
        };
        let is_form = content_type
            .to_str()
            .is_ok_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| {
                    debug!("Rejected form body: {}", e.body_text());
                    ApiError::InvalidPayload(e.body_text())
                })?;
            return Ok(Self(
                fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            ));
        }

        let Json(fields) = Json::<Map<String, Value>>::from_request(req, state)
            .await
            .map_err(|e| {
                debug!("Rejected JSON body: {}", e.body_text());
                ApiError::InvalidPayload(e.body_text())
            })?;
        Ok(Self(fields))
    }
}

impl Payload {
    /// A request without `Content-Type` is only accepted when it has no body,
    /// which reads as no fields at all.
    async fn from_untyped_body<S>(req: Request, state: &S) -> Result<Self, ApiError>
    where
        S: Send + Sync,
    {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidPayload(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            Ok(Self(Map::new()))
        } else {
            debug!("Rejected body without content type ({} bytes)", body.len());
            Err(ApiError::InvalidPayload(
                "Expected request with `Content-Type: application/json`".to_string(),
            ))
        }
    }
}

/// Presence check only: a required key holding `""` or `null` still passes.
pub fn validate_required(fields: &Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    if required.iter().all(|key| fields.contains_key(*key)) {
        Ok(())
    } else {
        Err(ApiError::MissingFields)
    }
}

pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Like [`field_text`] but a missing key or `null` yields `None`.
pub fn optional_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(field_text(value)),
    }
}

/// Text of a key that [`validate_required`] has already confirmed.
pub fn required_text(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).map(field_text).unwrap_or_default()
}
