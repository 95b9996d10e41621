use axum::routing::post;
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/visitors",
        post(handlers::record)
            .get(handlers::statistics)
            .delete(handlers::reset),
    )
}
