use axum::{extract::State, Json};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::auth::extractors::RequireAdmin;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{
    parse_date, parse_time, validate_week, HourView, HoursResponse, UpdateHoursRequest,
    UpdateVacationRequest, VacationView,
};
use super::repo::{OpeningHour, VacationMode};

/// Public opening hours plus the vacation state. The site falls back to its
/// built-in defaults when this read fails, so only real data is served here.
#[instrument(skip(state))]
pub async fn get_hours(State(state): State<AppState>) -> Result<Json<HoursResponse>, ApiError> {
    let hours = OpeningHour::list(&state.db).await?;
    let vacation = VacationMode::get(&state.db).await?;
    Ok(Json(HoursResponse {
        success: true,
        hours: hours.iter().map(HourView::from).collect(),
        vacation: VacationView::from_mode(&vacation, OffsetDateTime::now_utc()),
    }))
}

#[instrument(skip(state, payload, actor))]
pub async fn put_hours(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(payload): Json<UpdateHoursRequest>,
) -> Result<Json<HoursResponse>, ApiError> {
    validate_week(&payload.hours).map_err(ApiError::Validation)?;

    let rows: Vec<OpeningHour> = payload
        .hours
        .iter()
        .map(|h| OpeningHour {
            day_of_week: h.day_of_week,
            open_time: h.open_time.as_deref().and_then(parse_time).filter(|_| !h.closed),
            close_time: h.close_time.as_deref().and_then(parse_time).filter(|_| !h.closed),
            closed: h.closed,
        })
        .collect();
    OpeningHour::replace_all(&state.db, &rows).await?;
    info!(updated_by = %actor.id, "opening hours replaced");

    let hours = OpeningHour::list(&state.db).await?;
    let vacation = VacationMode::get(&state.db).await?;
    Ok(Json(HoursResponse {
        success: true,
        hours: hours.iter().map(HourView::from).collect(),
        vacation: VacationView::from_mode(&vacation, OffsetDateTime::now_utc()),
    }))
}

#[instrument(skip(state))]
pub async fn get_vacation(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let vacation = VacationMode::get(&state.db).await?;
    let view = VacationView::from_mode(&vacation, OffsetDateTime::now_utc());
    Ok(Json(serde_json::json!({ "success": true, "vacation": view })))
}

#[instrument(skip(state, payload, actor))]
pub async fn put_vacation(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(payload): Json<UpdateVacationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let start_date = match &payload.start_date {
        Some(s) => Some(
            parse_date(s).ok_or_else(|| ApiError::Validation("Invalid start_date".into()))?,
        ),
        None => None,
    };
    let end_date = match &payload.end_date {
        Some(s) => {
            Some(parse_date(s).ok_or_else(|| ApiError::Validation("Invalid end_date".into()))?)
        }
        None => None,
    };
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(ApiError::Validation(
                "start_date must not be after end_date".into(),
            ));
        }
    }

    let mode = VacationMode {
        active: payload.active,
        start_date,
        end_date,
        message: payload.message,
    };
    VacationMode::set(&state.db, &mode).await?;
    info!(updated_by = %actor.id, active = mode.active, "vacation mode updated");

    let view = VacationView::from_mode(&mode, OffsetDateTime::now_utc());
    Ok(Json(serde_json::json!({ "success": true, "vacation": view })))
}
