use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::role::Role;

/// Admin user record. The credential hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, active, created_at, last_login";

impl AdminUser {
    /// Find an active user by email. Disabled accounts are invisible here so
    /// a login against one fails exactly like an unknown email.
    pub async fn find_active_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM admin_users
            WHERE email = $1 AND active = TRUE
            "#
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM admin_users
            WHERE email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM admin_users
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Resolve the user behind a session token. The join enforces the
    /// session-validity predicate (`expires_at > now()`) and skips disabled
    /// accounts.
    pub async fn find_by_session(db: &PgPool, token: &str) -> anyhow::Result<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.name, u.role, u.active,
                   u.created_at, u.last_login
            FROM sessions s
            JOIN admin_users u ON u.id = s.user_id
            WHERE s.id = $1 AND s.expires_at > now() AND u.active = TRUE
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> anyhow::Result<AdminUser> {
        let user = sqlx::query_as::<_, AdminUser>(&format!(
            r#"
            INSERT INTO admin_users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE admin_users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = AdminUser {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            name: "Admin".into(),
            role: Role::SuperAdmin,
            active: true,
            created_at: datetime!(2025-01-01 00:00 UTC),
            last_login: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("admin@example.com"));
        assert!(json.contains("super_admin"));
    }
}
