use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// One key-value row. Not versioned; last writer wins.
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub category: String,
    pub description: String,
    pub value_type: String,
    pub updated_at: OffsetDateTime,
}

pub async fn load_all(db: &PgPool) -> anyhow::Result<Vec<SettingRow>> {
    let rows = sqlx::query_as::<_, SettingRow>(
        r#"
        SELECT key, value, category, description, value_type, updated_at
        FROM settings
        ORDER BY key ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn upsert(
    db: &PgPool,
    key: &str,
    value: &str,
    category: &str,
    description: &str,
    value_type: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, category, description, value_type, updated_at)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (key) DO UPDATE SET
            value = EXCLUDED.value,
            updated_at = now()
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(category)
    .bind(description)
    .bind(value_type)
    .execute(db)
    .await?;
    Ok(())
}
