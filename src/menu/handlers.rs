use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::RequireAdmin;
use crate::error::{Ack, ApiData, ApiError};
use crate::state::AppState;

use super::dto::{
    CategoryWithItems, CreateCategoryRequest, CreateItemRequest, MenuResponse,
    UpdateCategoryRequest, UpdateItemRequest,
};
use super::repo::{MenuCategory, MenuItem};

/// Public menu: active categories in display order, each with its active
/// items. Feeds the public site, so no guard.
#[instrument(skip(state))]
pub async fn public_menu(State(state): State<AppState>) -> Result<Json<MenuResponse>, ApiError> {
    let categories = MenuCategory::list_active(&state.db).await?;
    let items = MenuItem::list_active(&state.db).await?;

    let mut by_category: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
    for item in items {
        by_category.entry(item.category_id).or_default().push(item);
    }

    let categories = categories
        .into_iter()
        .map(|c| CategoryWithItems {
            items: by_category.remove(&c.id).unwrap_or_default(),
            id: c.id,
            name: c.name,
            description: c.description,
            display_order: c.display_order,
        })
        .collect();

    Ok(Json(MenuResponse {
        success: true,
        categories,
    }))
}

// --- categories ---

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ApiData<Vec<MenuCategory>>>, ApiError> {
    let categories = MenuCategory::list_all(&state.db).await?;
    Ok(ApiData::new(categories))
}

#[instrument(skip(state, payload, actor))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<ApiData<MenuCategory>>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Category name is required".into()));
    }
    if MenuCategory::find_by_name(&state.db, name).await?.is_some() {
        warn!(%name, "duplicate category name");
        return Err(ApiError::Conflict("Category name already exists".into()));
    }

    let category = MenuCategory::create(
        &state.db,
        name,
        payload.description.trim(),
        payload.display_order,
        payload.active,
    )
    .await?;
    info!(category_id = %category.id, created_by = %actor.id, "menu category created");
    Ok(ApiData::new(category))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiData<MenuCategory>>, ApiError> {
    let existing = MenuCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    let name = payload.name.unwrap_or(existing.name);
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Category name is required".into()));
    }
    if let Some(other) = MenuCategory::find_by_name(&state.db, &name).await? {
        if other.id != id {
            return Err(ApiError::Conflict("Category name already exists".into()));
        }
    }

    let category = MenuCategory::update(
        &state.db,
        id,
        &name,
        payload.description.as_deref().unwrap_or(&existing.description).trim(),
        payload.display_order.unwrap_or(existing.display_order),
        payload.active.unwrap_or(existing.active),
    )
    .await?;
    Ok(ApiData::new(category))
}

#[instrument(skip(state, actor))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    if MenuCategory::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("Category not found".into()));
    }
    if MenuCategory::count_items(&state.db, id).await? > 0 {
        return Err(ApiError::Conflict(
            "Category still has menu items".into(),
        ));
    }
    MenuCategory::delete(&state.db, id).await?;
    info!(category_id = %id, deleted_by = %actor.id, "menu category deleted");
    Ok(Ack::ok())
}

// --- items ---

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ApiData<Vec<MenuItem>>>, ApiError> {
    let items = MenuItem::list_all(&state.db).await?;
    Ok(ApiData::new(items))
}

#[instrument(skip(state, payload, actor))]
pub async fn create_item(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(payload): Json<CreateItemRequest>,
) -> Result<Json<ApiData<MenuItem>>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Item name is required".into()));
    }
    if payload.price_cents < 0 {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }
    if MenuCategory::find_by_id(&state.db, payload.category_id).await?.is_none() {
        return Err(ApiError::NotFound("Category not found".into()));
    }

    let item = MenuItem::create(
        &state.db,
        payload.category_id,
        name,
        payload.description.trim(),
        payload.price_cents,
        payload.image_url.as_deref(),
        payload.display_order,
        payload.active,
    )
    .await?;
    info!(item_id = %item.id, created_by = %actor.id, "menu item created");
    Ok(ApiData::new(item))
}

#[instrument(skip(state, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ApiData<MenuItem>>, ApiError> {
    let existing = MenuItem::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".into()))?;

    let category_id = payload.category_id.unwrap_or(existing.category_id);
    if category_id != existing.category_id
        && MenuCategory::find_by_id(&state.db, category_id).await?.is_none()
    {
        return Err(ApiError::NotFound("Category not found".into()));
    }
    let name = payload.name.unwrap_or(existing.name);
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Item name is required".into()));
    }
    let price_cents = payload.price_cents.unwrap_or(existing.price_cents);
    if price_cents < 0 {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }
    let image_url = payload.image_url.or(existing.image_url);

    let item = MenuItem::update(
        &state.db,
        id,
        category_id,
        name.trim(),
        payload.description.as_deref().unwrap_or(&existing.description).trim(),
        price_cents,
        image_url.as_deref(),
        payload.display_order.unwrap_or(existing.display_order),
        payload.active.unwrap_or(existing.active),
    )
    .await?;
    Ok(ApiData::new(item))
}

#[instrument(skip(state, actor))]
pub async fn delete_item(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    let deleted = MenuItem::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Item not found".into()));
    }
    info!(item_id = %id, deleted_by = %actor.id, "menu item deleted");
    Ok(Ack::ok())
}
