use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::MenuItem;

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

/// One active category with its active items, as the public site renders it.
#[derive(Debug, Serialize)]
pub struct CategoryWithItems {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub display_order: i32,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub success: bool,
    pub categories: Vec<CategoryWithItems>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_category_defaults() {
        let req: CreateCategoryRequest =
            serde_json::from_str(r#"{"name": "Antipasti"}"#).unwrap();
        assert_eq!(req.name, "Antipasti");
        assert_eq!(req.description, "");
        assert_eq!(req.display_order, 0);
        assert!(req.active);
    }

    #[test]
    fn create_item_requires_category_and_price() {
        let err = serde_json::from_str::<CreateItemRequest>(r#"{"name": "Bruschetta"}"#);
        assert!(err.is_err());
    }
}
