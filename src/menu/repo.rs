use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuCategory {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub display_order: i32,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in cents; avoids float drift on money.
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const CATEGORY_COLUMNS: &str = "id, name, description, display_order, active, created_at";
const ITEM_COLUMNS: &str =
    "id, category_id, name, description, price_cents, image_url, display_order, active, created_at";

impl MenuCategory {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<MenuCategory>> {
        let rows = sqlx::query_as::<_, MenuCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu_categories ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<MenuCategory>> {
        let rows = sqlx::query_as::<_, MenuCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu_categories WHERE active = TRUE ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MenuCategory>> {
        let row = sqlx::query_as::<_, MenuCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<MenuCategory>> {
        let row = sqlx::query_as::<_, MenuCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu_categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        description: &str,
        display_order: i32,
        active: bool,
    ) -> anyhow::Result<MenuCategory> {
        let row = sqlx::query_as::<_, MenuCategory>(&format!(
            r#"
            INSERT INTO menu_categories (name, description, display_order, active)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(display_order)
        .bind(active)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: &str,
        description: &str,
        display_order: i32,
        active: bool,
    ) -> anyhow::Result<MenuCategory> {
        let row = sqlx::query_as::<_, MenuCategory>(&format!(
            r#"
            UPDATE menu_categories
            SET name = $2, description = $3, display_order = $4, active = $5
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(display_order)
        .bind(active)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM menu_categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Item count regardless of the items' active flag; deletion is blocked
    /// while any item still references the category.
    pub async fn count_items(db: &PgPool, id: Uuid) -> anyhow::Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE category_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;
        Ok(count)
    }
}

impl MenuItem {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE active = TRUE ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        category_id: Uuid,
        name: &str,
        description: &str,
        price_cents: i64,
        image_url: Option<&str>,
        display_order: i32,
        active: bool,
    ) -> anyhow::Result<MenuItem> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            r#"
            INSERT INTO menu_items (category_id, name, description, price_cents, image_url, display_order, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(price_cents)
        .bind(image_url)
        .bind(display_order)
        .bind(active)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        category_id: Uuid,
        name: &str,
        description: &str,
        price_cents: i64,
        image_url: Option<&str>,
        display_order: i32,
        active: bool,
    ) -> anyhow::Result<MenuItem> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            r#"
            UPDATE menu_items
            SET category_id = $2, name = $3, description = $4, price_cents = $5,
                image_url = $6, display_order = $7, active = $8
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(price_cents)
        .bind(image_url)
        .bind(display_order)
        .bind(active)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
