use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use emoji_db::models::UserRow;
use emoji_types::api::LoginResponse;

use crate::clock;
use crate::crypto;
use crate::error::ApiError;
use crate::payload::{Payload, required_text, validate_required};
use crate::responses::reply;
use crate::state::{AppState, blocking};

const CREDENTIAL_FIELDS: [&str; 2] = ["username", "password"];

/// Sessions are valid for 24 hours after login. Not enforced anywhere.
const SESSION_TTL_SECS: i64 = 86_400;

/// Header names the logout token is read from.
const TOKEN_HEADERS: [&str; 2] = ["token", "http_token"];

/// New token/expiry pair for a user. An empty token clears the session.
#[derive(Debug)]
pub struct TokenUpdate {
    pub id: i64,
    pub token: String,
    pub expires: Option<i64>,
}

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    Payload(fields): Payload,
) -> Result<Response, ApiError> {
    validate_required(&fields, &CREDENTIAL_FIELDS)?;

    let username = required_text(&fields, "username");
    let password_hash = crypto::sha256_hex(&required_text(&fields, "password"));

    if find_by_credentials(&state, &username, &password_hash).await?.is_some() {
        return Ok(reply(StatusCode::BAD_REQUEST, "User already exists."));
    }

    let users = state.users.clone();
    let name = username.clone();
    if blocking(move || users.insert(&name, &password_hash)).await? {
        info!("User '{}' registered", username);
        Ok(reply(StatusCode::CREATED, "User successfully registered."))
    } else {
        warn!("Store did not persist user '{}'", username);
        Ok(reply(StatusCode::BAD_REQUEST, "Error registering user."))
    }
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Payload(fields): Payload,
) -> Result<Response, ApiError> {
    validate_required(&fields, &CREDENTIAL_FIELDS)?;

    let username = required_text(&fields, "username");
    let password_hash = crypto::sha256_hex(&required_text(&fields, "password"));

    let Some(user) = find_by_credentials(&state, &username, &password_hash).await? else {
        warn!("Failed login for '{}'", username);
        return Ok(reply(StatusCode::BAD_REQUEST, "Invalid login credentials."));
    };

    let now = clock::unix_now();
    let token = crypto::issue_token(&username, now);
    let update = TokenUpdate {
        id: user.id,
        token: token.clone(),
        expires: Some(now + SESSION_TTL_SECS),
    };

    if update_user_token(&state, update).await {
        info!("User '{}' logged in", username);
        Ok(Json(LoginResponse {
            message: "login successful".to_string(),
            token,
        })
        .into_response())
    } else {
        Ok(reply(StatusCode::BAD_REQUEST, "Error authenticating user."))
    }
}

/// POST /users/logout. The session token comes from the `Token` header.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(token) = single_token(&headers) else {
        return Ok(reply(StatusCode::BAD_REQUEST, "no token provided"));
    };

    let users = state.users.clone();
    let holder = blocking(move || users.find_by_token(&token)).await?;

    let Some(user) = holder else {
        return Ok(reply(StatusCode::BAD_REQUEST, "Invalid token provided"));
    };

    let update = TokenUpdate {
        id: user.id,
        token: String::new(),
        expires: None,
    };

    if update_user_token(&state, update).await {
        info!("User '{}' logged out", user.username);
        Ok(reply(StatusCode::OK, "successfully logged out."))
    } else {
        Ok(reply(StatusCode::BAD_REQUEST, "error logging out."))
    }
}

/// Overwrite a user's token and expiry. Store errors are logged and reported
/// as `false`.
pub async fn update_user_token(state: &AppState, update: TokenUpdate) -> bool {
    let users = state.users.clone();
    let id = update.id;

    match blocking(move || users.update_token(update.id, &update.token, update.expires)).await {
        Ok(saved) => saved,
        Err(e) => {
            warn!("Token update failed for user {}: {}", id, e);
            false
        }
    }
}

/// First user registered under `username` whose stored hash equals
/// `password_hash`.
async fn find_by_credentials(
    state: &AppState,
    username: &str,
    password_hash: &str,
) -> Result<Option<UserRow>, ApiError> {
    let users = state.users.clone();
    let name = username.to_string();
    let candidates = blocking(move || users.find_by_username(&name)).await?;

    Ok(candidates
        .into_iter()
        .find(|user| crypto::hashes_match(&user.password, password_hash)))
}

/// The token when exactly one non-empty value was sent. Header lines are
/// split on commas, so `Token: a, b` counts as two values. A line that is
/// not valid UTF-8 rejects the whole header.
fn single_token(headers: &HeaderMap) -> Option<String> {
    let mut values: Vec<&str> = Vec::new();
    for raw in TOKEN_HEADERS
        .iter()
        .flat_map(|name| headers.get_all(*name).into_iter())
    {
        let line = raw.to_str().ok()?;
        values.extend(line.split(',').map(str::trim));
    }

    match values.as_slice() {
        [only] if !only.is_empty() => Some((*only).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn exactly_one_token_is_accepted() {
        assert_eq!(single_token(&headers(&[("token", "abc")])).as_deref(), Some("abc"));
        assert_eq!(single_token(&headers(&[("http_token", "abc")])).as_deref(), Some("abc"));
    }

    #[test]
    fn missing_or_empty_token_is_rejected() {
        assert_eq!(single_token(&HeaderMap::new()), None);
        assert_eq!(single_token(&headers(&[("token", "")])), None);
    }

    #[test]
    fn several_tokens_are_rejected() {
        assert_eq!(single_token(&headers(&[("token", "a, b")])), None);
        assert_eq!(single_token(&headers(&[("token", "a"), ("token", "b")])), None);
        assert_eq!(single_token(&headers(&[("token", "a"), ("http_token", "b")])), None);

        let mut map = headers(&[("token", "abc")]);
        map.append("token", HeaderValue::from_bytes(b"\xffbad").unwrap());
        assert_eq!(single_token(&map), None);
    }

    #[test]
    fn undecodable_token_alone_is_rejected() {
        let mut map = HeaderMap::new();
        map.append("token", HeaderValue::from_bytes(b"\xfftok").unwrap());
        assert_eq!(single_token(&map), None);
    }
}
