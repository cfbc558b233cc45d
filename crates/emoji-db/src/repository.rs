use anyhow::Result;

use crate::models::{EmojiChanges, EmojiRow, NewEmoji, UserRow};

/// Persistence operations the emoji handlers depend on.
///
/// Write methods return `Ok(false)` when the store accepted the call but
/// changed nothing (e.g. no row with that id).
pub trait EmojiRepository: Send + Sync {
    fn all(&self) -> Result<Vec<EmojiRow>>;

    fn find_by_id(&self, id: i64) -> Result<Option<EmojiRow>>;

    fn insert(&self, emoji: &NewEmoji) -> Result<bool>;

    /// Applies `changes` and stamps `date_modified`.
    fn update(&self, id: i64, changes: &EmojiChanges, date_modified: &str) -> Result<bool>;

    fn delete(&self, id: i64) -> Result<bool>;
}

/// Persistence operations the account handlers depend on.
pub trait UserRepository: Send + Sync {
    /// All users registered under `username`, oldest first.
    fn find_by_username(&self, username: &str) -> Result<Vec<UserRow>>;

    fn find_by_token(&self, token: &str) -> Result<Option<UserRow>>;

    fn insert(&self, username: &str, password_hash: &str) -> Result<bool>;

    fn update_token(&self, id: i64, token: &str, expires: Option<i64>) -> Result<bool>;
}
