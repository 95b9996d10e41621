use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::warn;

use crate::auth::repo::AdminUser;
use crate::auth::role::RoleTier;
use crate::auth::session::session_token_from_headers;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the acting user from the session cookie. Rejects with 401 when
/// the cookie is absent ("Not authenticated") or joins to no valid session
/// ("Session expired").
pub struct CurrentUser(pub AdminUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers, &state.config.session.cookie_name)
            .ok_or(ApiError::Unauthorized("Not authenticated"))?;
        let user = AdminUser::find_by_session(&state.db, &token)
            .await?
            .ok_or(ApiError::Unauthorized("Session expired"))?;
        Ok(CurrentUser(user))
    }
}

/// Gate for the admin-or-above tier. Pure check, no side effects.
pub struct RequireAdmin(pub AdminUser);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !RoleTier::AdminOrAbove.allows(user.role) {
            warn!(user_id = %user.id, role = user.role.as_str(), "admin tier denied");
            return Err(ApiError::Forbidden);
        }
        Ok(RequireAdmin(user))
    }
}

/// Gate for the super-admin-only tier (user deletion).
pub struct RequireSuperAdmin(pub AdminUser);

#[async_trait]
impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !RoleTier::SuperAdminOnly.allows(user.role) {
            warn!(user_id = %user.id, role = user.role.as_str(), "super admin tier denied");
            return Err(ApiError::Forbidden);
        }
        Ok(RequireSuperAdmin(user))
    }
}
