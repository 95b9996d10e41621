use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::auth::extractors::RequireAdmin;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{key_metadata, SettingsResponse, SiteSettings, UpdateSettingsRequest};
use super::repo;

async fn merged(state: &AppState) -> anyhow::Result<SiteSettings> {
    let rows = repo::load_all(&state.db).await?;
    Ok(SiteSettings::from_rows(
        rows.iter().map(|r| (r.key.as_str(), r.value.as_str())),
    ))
}

/// Public: the merged settings feed the public site's header and footer.
#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = merged(&state).await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}

#[instrument(skip(state, payload, actor))]
pub async fn put_settings(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    if payload.settings.is_empty() {
        return Err(ApiError::Validation("No settings provided".into()));
    }
    // Validate the whole batch before writing anything.
    for key in payload.settings.keys() {
        if key_metadata(key).is_none() {
            return Err(ApiError::Validation(format!("Unknown setting key: {key}")));
        }
    }
    for (key, value) in &payload.settings {
        let (category, description, value_type) =
            key_metadata(key).expect("validated above");
        repo::upsert(&state.db, key, value, category, description, value_type).await?;
    }
    info!(updated_by = %actor.id, keys = payload.settings.len(), "settings updated");

    let settings = merged(&state).await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}
