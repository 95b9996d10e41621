use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use tracing::{instrument, warn};

use crate::auth::extractors::RequireAdmin;
use crate::error::{Ack, ApiError};
use crate::state::AppState;

use super::dto::{RecordVisitRequest, ResetQuery, StatisticsResponse};
use super::{repo, service};

#[instrument(skip(state, headers, payload))]
pub async fn record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RecordVisitRequest>,
) -> Result<Json<Ack>, ApiError> {
    if payload.page.trim().is_empty() {
        return Err(ApiError::Validation("page is required".into()));
    }
    service::ingest(&state.db, state.config.environment, &headers, &payload).await?;
    Ok(Ack::ok())
}

#[instrument(skip(state))]
pub async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = service::statistics(&state.db).await?;
    Ok(Json(stats))
}

/// Irreversible. Demands the literal `confirm=true` and the admin tier.
#[instrument(skip(state, actor))]
pub async fn reset(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(query): Query<ResetQuery>,
) -> Result<Json<Ack>, ApiError> {
    if query.confirm.as_deref() != Some("true") {
        return Err(ApiError::Validation(
            "Confirmation required: pass confirm=true".into(),
        ));
    }
    repo::reset_all(&state.db).await?;
    warn!(user_id = %actor.id, "all visitor statistics wiped");
    Ok(Ack::ok())
}
