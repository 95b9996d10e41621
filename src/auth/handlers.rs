use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use time::Duration;
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, LoginRequest};
use crate::auth::extractors::CurrentUser;
use crate::auth::password::verify_password;
use crate::auth::repo::AdminUser;
use crate::auth::session::{
    build_clearing_cookie, build_session_cookie, session_token_from_headers, Session,
};
use crate::error::{Ack, ApiError};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn set_cookie_headers(cookie: String) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie.parse().expect("valid cookie"));
    headers
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    // Unknown email, disabled account and wrong password all surface the
    // same generic message.
    let user = match AdminUser::find_active_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown or inactive email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    let ttl_hours = state.config.session.ttl_hours;
    let session = Session::create(&state.db, user.id, Duration::hours(ttl_hours)).await?;
    AdminUser::touch_last_login(&state.db, user.id).await?;

    let cookie = build_session_cookie(
        &state.config.session.cookie_name,
        &session.id,
        ttl_hours * 3600,
        state.config.environment.is_production(),
    );

    info!(user_id = %user.id, email = %user.email, "admin logged in");
    Ok((set_cookie_headers(cookie), Json(AuthResponse::new(user))))
}

#[instrument(skip_all)]
pub async fn whoami(CurrentUser(user): CurrentUser) -> Json<AuthResponse> {
    Json(AuthResponse::new(user))
}

/// Idempotent: succeeds with or without a (valid) session cookie.
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<Ack>), ApiError> {
    if let Some(token) = session_token_from_headers(&headers, &state.config.session.cookie_name) {
        Session::delete(&state.db, &token).await?;
        info!("session destroyed");
    }
    let cookie = build_clearing_cookie(
        &state.config.session.cookie_name,
        state.config.environment.is_production(),
    );
    Ok((set_cookie_headers(cookie), Ack::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role::Role;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn auth_response_wraps_public_profile() {
        let user = AdminUser {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: "hash".into(),
            name: "Admin".into(),
            role: Role::Admin,
            active: true,
            created_at: datetime!(2025-06-01 12:00 UTC),
            last_login: None,
        };
        let json = serde_json::to_value(AuthResponse::new(user)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["email"], "admin@example.com");
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn set_cookie_header_is_built() {
        let headers = set_cookie_headers("session=tok; Path=/".into());
        assert_eq!(headers.get(header::SET_COOKIE).unwrap(), "session=tok; Path=/");
    }
}
