use axum::routing::post;
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod role;
pub mod session;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/auth",
        post(handlers::login)
            .get(handlers::whoami)
            .delete(handlers::logout),
    )
}
