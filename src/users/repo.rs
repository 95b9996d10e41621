use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::repo::AdminUser;
use crate::auth::role::Role;

impl AdminUser {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<AdminUser>> {
        let users = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT id, email, password_hash, name, role, active, created_at, last_login
            FROM admin_users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: &str,
        role: Role,
        active: bool,
    ) -> anyhow::Result<AdminUser> {
        let user = sqlx::query_as::<_, AdminUser>(
            r#"
            UPDATE admin_users
            SET name = $2, role = $3, active = $4
            WHERE id = $1
            RETURNING id, email, password_hash, name, role, active, created_at, last_login
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(role)
        .bind(active)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn update_password_hash(db: &PgPool, id: Uuid, hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE admin_users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Sessions of the deleted user go with the row (FK cascade).
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_super_admins(db: &PgPool) -> anyhow::Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE role = 'super_admin'")
                .fetch_one(db)
                .await?;
        Ok(count)
    }

    pub async fn count_all(db: &PgPool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Creates the initial super admin when the table is empty, so the
    /// at-least-one-super-admin invariant holds from the first request.
    pub async fn ensure_bootstrap(db: &PgPool, email: &str, password: &str) -> anyhow::Result<bool> {
        if AdminUser::count_all(db).await? > 0 {
            return Ok(false);
        }
        let hash = hash_password(password)?;
        let user = AdminUser::create(db, email, &hash, "Administrator", Role::SuperAdmin).await?;
        info!(user_id = %user.id, email = %user.email, "bootstrap super admin created");
        Ok(true)
    }
}
