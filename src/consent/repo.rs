use sqlx::PgPool;
use uuid::Uuid;

pub struct NewConsent<'a> {
    pub id: Uuid,
    pub categories: &'a serde_json::Value,
    pub policy_version: &'a str,
    pub client_timestamp: &'a str,
    pub user_agent: &'a str,
    pub ip_hash: &'a str,
}

pub async fn upsert(db: &PgPool, consent: &NewConsent<'_>) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO consents (id, categories, policy_version, client_timestamp, user_agent, ip_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            categories = EXCLUDED.categories,
            policy_version = EXCLUDED.policy_version,
            client_timestamp = EXCLUDED.client_timestamp,
            user_agent = EXCLUDED.user_agent,
            ip_hash = EXCLUDED.ip_hash
        "#,
    )
    .bind(consent.id)
    .bind(consent.categories)
    .bind(consent.policy_version)
    .bind(consent.client_timestamp)
    .bind(consent.user_agent)
    .bind(consent.ip_hash)
    .execute(db)
    .await?;
    Ok(())
}
