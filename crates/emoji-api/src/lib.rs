pub mod clock;
pub mod crypto;
pub mod emojis;
pub mod error;
pub mod payload;
pub mod responses;
pub mod state;
pub mod users;


use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

pub use state::{AppState, AppStateInner};

/// Route table for the whole service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/emojis", get(emojis::list_emojis).post(emojis::create_emoji))
        .route(
            "/emojis/{id}",
            get(emojis::get_emoji)
                .put(emojis::replace_emoji)
                .patch(emojis::patch_emoji)
                .delete(emojis::delete_emoji),
        )
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/logout", post(users::logout))
        .with_state(state)
}

async fn root() -> Response {
    responses::reply(StatusCode::OK, "welcome to the naija-emoji RESTful Api")
}
