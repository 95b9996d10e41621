use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::{RequireAdmin, RequireSuperAdmin};
use crate::auth::password::hash_password;
use crate::auth::repo::AdminUser;
use crate::auth::role::Role;
use crate::error::{Ack, ApiData, ApiError};
use crate::state::AppState;

use super::dto::{is_valid_email, CreateUserRequest, UpdateUserRequest};

/// Deleting the last remaining super admin would lock everyone out of user
/// management. Global check, independent of the caller's own role.
pub(crate) fn deletion_blocked(target_role: Role, super_admin_count: i64) -> bool {
    target_role == Role::SuperAdmin && super_admin_count <= 1
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ApiData<Vec<AdminUser>>>, ApiError> {
    let users = AdminUser::list(&state.db).await?;
    Ok(ApiData::new(users))
}

#[instrument(skip(state, payload, actor))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<Json<ApiData<AdminUser>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }

    if AdminUser::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = AdminUser::create(
        &state.db,
        &payload.email,
        &hash,
        payload.name.trim(),
        payload.role,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, created_by = %actor.id, "admin user created");
    Ok(ApiData::new(user))
}

#[instrument(skip(state, payload, actor))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiData<AdminUser>>, ApiError> {
    let existing = AdminUser::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let name = payload.name.unwrap_or(existing.name);
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    let role = payload.role.unwrap_or(existing.role);
    let active = payload.active.unwrap_or(existing.active);
    let password_hash = match &payload.password {
        Some(password) if password.len() < 8 => {
            return Err(ApiError::Validation("Password too short".into()))
        }
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    if let Some(hash) = &password_hash {
        AdminUser::update_password_hash(&state.db, id, hash).await?;
    }
    let user = AdminUser::update(&state.db, id, name.trim(), role, active).await?;
    info!(user_id = %user.id, updated_by = %actor.id, "admin user updated");
    Ok(ApiData::new(user))
}

#[instrument(skip(state, actor))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSuperAdmin(actor): RequireSuperAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    let target = AdminUser::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let super_admins = AdminUser::count_super_admins(&state.db).await?;
    if deletion_blocked(target.role, super_admins) {
        warn!(user_id = %target.id, "refused to delete the last super admin");
        return Err(ApiError::Conflict("Cannot delete the last super admin".into()));
    }

    AdminUser::delete(&state.db, id).await?;
    info!(user_id = %target.id, deleted_by = %actor.id, "admin user deleted");
    Ok(Ack::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_super_admin_cannot_be_deleted() {
        assert!(deletion_blocked(Role::SuperAdmin, 1));
    }

    #[test]
    fn second_super_admin_can_be_deleted() {
        assert!(!deletion_blocked(Role::SuperAdmin, 2));
    }

    #[test]
    fn plain_admins_are_always_deletable() {
        assert!(!deletion_blocked(Role::Admin, 1));
        assert!(!deletion_blocked(Role::Admin, 5));
    }
}
