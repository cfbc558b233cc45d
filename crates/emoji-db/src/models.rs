//! Database row types. These map directly to SQLite rows and are kept
//! separate from the emoji-types API models.

pub struct EmojiRow {
    pub id: i64,
    pub name: String,
    pub glyph: String,
    /// JSON array text, e.g. `["fun","happy"]`.
    pub keywords: String,
    pub category: String,
    pub created_by: Option<String>,
    pub date_created: String,
    pub date_modified: String,
}

pub struct NewEmoji {
    pub name: String,
    pub glyph: String,
    pub keywords: String,
    pub category: String,
    pub created_by: Option<String>,
    pub timestamp: String,
}

/// Column overwrites for an existing emoji. `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct EmojiChanges {
    pub name: Option<String>,
    pub glyph: Option<String>,
    pub keywords: Option<String>,
    pub category: Option<String>,
    pub created_by: Option<String>,
}

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub token: Option<String>,
    pub expires: Option<i64>,
}
