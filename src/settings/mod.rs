use axum::routing::get;
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(handlers::get_settings).put(handlers::put_settings))
}
