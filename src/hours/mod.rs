use axum::routing::get;
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hours", get(handlers::get_hours).put(handlers::put_hours))
        .route(
            "/vacation",
            get(handlers::get_vacation).put(handlers::put_vacation),
        )
}
