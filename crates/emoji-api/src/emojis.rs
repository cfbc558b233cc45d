use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use emoji_db::models::{EmojiChanges, EmojiRow, NewEmoji};
use emoji_types::models::Emoji;

use crate::clock;
use crate::error::ApiError;
use crate::payload::{Payload, optional_text, required_text, validate_required};
use crate::responses::reply;
use crate::state::{AppState, blocking};

const REQUIRED_FIELDS: [&str; 4] = ["name", "char", "keywords", "category"];

/// Body keys PUT and PATCH may write. Everything else is ignored.
const WRITABLE_FIELDS: [&str; 5] = ["name", "char", "keywords", "category", "created_by"];

/// GET /emojis
pub async fn list_emojis(State(state): State<AppState>) -> Result<Response, ApiError> {
    let repo = state.emojis.clone();
    let rows = blocking(move || repo.all()).await?;

    let emojis: Vec<Emoji> = rows.into_iter().map(to_emoji).collect();
    let status = if emojis.is_empty() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::OK
    };

    Ok(reply(status, emojis))
}

/// GET /emojis/{id}. A missing record is answered with `null`, not 404.
pub async fn get_emoji(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let repo = state.emojis.clone();
    let row = blocking(move || repo.find_by_id(id)).await?;

    Ok(reply(StatusCode::OK, row.map(to_emoji)))
}

/// POST /emojis
pub async fn create_emoji(
    State(state): State<AppState>,
    Payload(fields): Payload,
) -> Result<Response, ApiError> {
    validate_required(&fields, &REQUIRED_FIELDS)?;

    let emoji = NewEmoji {
        name: required_text(&fields, "name"),
        glyph: required_text(&fields, "char"),
        keywords: keywords_json(fields.get("keywords").unwrap_or(&Value::Null))?,
        category: required_text(&fields, "category"),
        created_by: optional_text(&fields, "created_by"),
        timestamp: clock::timestamp(),
    };

    let repo = state.emojis.clone();
    let name = emoji.name.clone();
    if blocking(move || repo.insert(&emoji)).await? {
        info!("Emoji '{}' added", name);
        Ok(reply(StatusCode::OK, "Emoji added succesfully."))
    } else {
        warn!("Store did not persist emoji '{}'", name);
        Ok(reply(StatusCode::NOT_MODIFIED, "Error adding emoji."))
    }
}

/// PUT /emojis/{id}
pub async fn replace_emoji(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(fields): Payload,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    validate_required(&fields, &REQUIRED_FIELDS)?;

    if apply_changes(&state, id, &fields).await? {
        info!("Emoji {} replaced", id);
        Ok(reply(StatusCode::OK, "Emoji updated succesfully."))
    } else {
        warn!("Store did not update emoji {}", id);
        Ok(reply(StatusCode::NOT_MODIFIED, "Error updating emoji."))
    }
}

/// PATCH /emojis/{id}. Any subset of the writable fields.
pub async fn patch_emoji(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(fields): Payload,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    if apply_changes(&state, id, &fields).await? {
        info!("Emoji {} patched", id);
        Ok(reply(StatusCode::OK, "Emoji updated succesfully"))
    } else {
        warn!("Store did not update emoji {}", id);
        Ok(reply(StatusCode::NOT_MODIFIED, "Error updating emoji"))
    }
}

/// DELETE /emojis/{id}
pub async fn delete_emoji(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let repo = state.emojis.clone();

    if blocking(move || repo.delete(id)).await? {
        info!("Emoji {} deleted", id);
        Ok(reply(StatusCode::OK, "Emoji deleted succesfully."))
    } else {
        Ok(reply(StatusCode::BAD_REQUEST, "Error deleting emoji."))
    }
}

async fn apply_changes(
    state: &AppState,
    id: i64,
    fields: &Map<String, Value>,
) -> Result<bool, ApiError> {
    let changes = writable_changes(fields)?;
    let repo = state.emojis.clone();
    let now = clock::timestamp();
    blocking(move || repo.update(id, &changes, &now)).await
}

fn writable_changes(fields: &Map<String, Value>) -> Result<EmojiChanges, ApiError> {
    for key in fields.keys().filter(|k| !WRITABLE_FIELDS.contains(&k.as_str())) {
        debug!("Ignoring non-writable emoji field '{}'", key);
    }

    let keywords = match fields.get("keywords") {
        None | Some(Value::Null) => None,
        Some(value) => Some(keywords_json(value)?),
    };

    Ok(EmojiChanges {
        name: optional_text(fields, "name"),
        glyph: optional_text(fields, "char"),
        keywords,
        category: optional_text(fields, "category"),
        created_by: optional_text(fields, "created_by"),
    })
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

/// `"fun,happy"` -> `["fun","happy"]`. Entries are kept verbatim, spaces included.
pub fn encode_keywords(raw: &str) -> String {
    Value::from(raw.split(',').collect::<Vec<_>>()).to_string()
}

/// Stored form of a `keywords` body value: a comma-separated string is split,
/// a list of strings is kept as is.
fn keywords_json(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(raw) => Ok(encode_keywords(raw)),
        Value::Null => Ok(encode_keywords("")),
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.to_string()),
        _ => Err(ApiError::InvalidKeywords),
    }
}

fn to_emoji(row: EmojiRow) -> Emoji {
    let keywords = serde_json::from_str(&row.keywords).unwrap_or_else(|e| {
        warn!("Corrupt keywords '{}' on emoji {}: {}", row.keywords, row.id, e);
        Vec::new()
    });

    Emoji {
        id: row.id,
        name: row.name,
        glyph: row.glyph,
        keywords,
        category: row.category,
        created_by: row.created_by,
        date_created: row.date_created,
        date_modified: row.date_modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keywords_are_split_on_commas() {
        assert_eq!(encode_keywords("fun,happy"), r#"["fun","happy"]"#);
        assert_eq!(encode_keywords("solo"), r#"["solo"]"#);
        assert_eq!(encode_keywords("a, b"), r#"["a"," b"]"#);
        assert_eq!(encode_keywords(""), r#"[""]"#);
    }

    #[test]
    fn only_writable_fields_become_changes() {
        let fields = match json!({
            "id": 99,
            "date_created": "1999-01-01 00:00:00",
            "keywords": "x,y",
            "category": "flags",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let changes = writable_changes(&fields).unwrap();
        assert_eq!(changes.keywords.as_deref(), Some(r#"["x","y"]"#));
        assert_eq!(changes.category.as_deref(), Some("flags"));
        assert!(changes.name.is_none());
        assert!(changes.glyph.is_none());
    }

    #[test]
    fn keyword_values_by_shape() {
        assert_eq!(keywords_json(&json!("a,b")).unwrap(), r#"["a","b"]"#);
        assert_eq!(keywords_json(&json!(["a", "b,c"])).unwrap(), r#"["a","b,c"]"#);
        assert_eq!(keywords_json(&Value::Null).unwrap(), r#"[""]"#);
        assert!(matches!(keywords_json(&json!(3)), Err(ApiError::InvalidKeywords)));
        assert!(matches!(keywords_json(&json!([1])), Err(ApiError::InvalidKeywords)));
    }

    #[test]
    fn corrupt_keywords_decode_to_empty() {
        let emoji = to_emoji(EmojiRow {
            id: 1,
            name: "grin".into(),
            glyph: "😁".into(),
            keywords: "fun,happy".into(),
            category: "faces".into(),
            created_by: None,
            date_created: "2024-01-01 00:00:00".into(),
            date_modified: "2024-01-01 00:00:00".into(),
        });
        assert!(emoji.keywords.is_empty());
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidId)));
    }
}
