use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(handlers::public_menu))
        .route(
            "/menu/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/menu/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/menu/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/menu/items/:id",
            put(handlers::update_item).delete(handlers::delete_item),
        )
}
