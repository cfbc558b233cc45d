use serde::{Deserialize, Serialize};

/// An emoji record as returned by the API.
///
/// `keywords` is stored as a JSON array string and decoded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub id: i64,
    pub name: String,
    #[serde(rename = "char")]
    pub glyph: String,
    pub keywords: Vec<String>,
    pub category: String,
    pub created_by: Option<String>,
    pub date_created: String,
    pub date_modified: String,
}
