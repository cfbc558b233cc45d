use std::sync::Arc;

use tracing::error;

use emoji_db::{Database, EmojiRepository, UserRepository};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub emojis: Arc<dyn EmojiRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppStateInner {
    /// Both handler groups share one SQLite database.
    pub fn from_db(db: Arc<Database>) -> AppState {
        Arc::new(Self {
            emojis: db.clone(),
            users: db,
        })
    }
}

/// Run a blocking store call off the async runtime.
pub async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Worker(e.to_string())
        })?
        .map_err(ApiError::from)
}
