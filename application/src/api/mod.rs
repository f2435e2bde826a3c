//! REST API definitions.

pub mod login;
pub mod user;

use axum::{
    routing::{get, post},
    Router,
};

/// Builds the [`Router`] serving the REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login::login))
        .route("/users", get(user::list).post(user::create))
        .route(
            "/users/:id",
            get(user::get).put(user::update).delete(user::delete),
        )
}
