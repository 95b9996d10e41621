use axum::http::{header, HeaderMap};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

/// Length of the opaque session token.
const TOKEN_LEN: usize = 64;

/// A login session row. Valid iff `now < expires_at`; expired rows are
/// ignored by lookups and swept by the background reaper.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

impl Session {
    pub async fn create(db: &PgPool, user_id: Uuid, ttl: Duration) -> anyhow::Result<Session> {
        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + ttl;
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, created_at, expires_at
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Idempotent: deleting an unknown token is not an error.
    pub async fn delete(db: &PgPool, token: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete_expired(db: &PgPool) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Builds the login `Set-Cookie` value: HttpOnly, SameSite=Strict, Path=/,
/// Secure outside local development.
pub fn build_session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// An immediately-expiring cookie that clears the session on the client.
pub fn build_clearing_cookie(name: &str, secure: bool) -> String {
    build_session_cookie(name, "", 0, secure)
}

/// Extracts the session token from the request's `Cookie` header(s).
pub fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Periodically deletes sessions past expiry. Expiry stays a logical
/// predicate on reads; this only bounds table growth.
pub fn spawn_expired_session_reaper(db: PgPool, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match Session::delete_expired(&db).await {
                Ok(0) => {}
                Ok(n) => debug!(deleted = n, "swept expired sessions"),
                Err(e) => warn!(error = %e, "session sweep failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_alphanumeric_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn login_cookie_attributes() {
        let cookie = build_session_cookie("session", "abc123", 86400, false);
        assert_eq!(
            cookie,
            "session=abc123; Path=/; Max-Age=86400; HttpOnly; SameSite=Strict"
        );
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn login_cookie_is_secure_in_production() {
        let cookie = build_session_cookie("session", "abc123", 86400, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let cookie = build_clearing_cookie("session", false);
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn parses_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; session=tok123; consent=yes".parse().unwrap(),
        );
        assert_eq!(
            session_token_from_headers(&headers, "session"),
            Some("tok123".to_string())
        );
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_token_from_headers(&headers, "session"), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "session=".parse().unwrap());
        assert_eq!(session_token_from_headers(&headers, "session"), None);
    }
}
