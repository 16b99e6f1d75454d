//! Living-art schedule handlers.
//!
//! Schedules swap the artwork a QRON displays for a time window. They are
//! attached to a QRON and managed by its owner; evaluation happens wherever
//! the artwork is served, which is out of scope here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qron_core::{Schedule, ScheduleId, Transition};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::qrons::load_owned_qron;
use crate::state::AppState;

/// Schedule as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    /// Schedule id.
    pub id: String,
    /// Window start.
    pub start_time: String,
    /// Window end, when bounded.
    pub end_time: Option<String>,
    /// Image shown during the window.
    pub target_image_url: String,
    /// Transition style.
    pub transition: Transition,
    /// Whether the entry is active.
    pub is_active: bool,
}

impl From<&Schedule> for ScheduleResponse {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.to_string(),
            start_time: schedule.start_time.to_rfc3339(),
            end_time: schedule.end_time.map(|t| t.to_rfc3339()),
            target_image_url: schedule.target_image_url.clone(),
            transition: schedule.transition,
            is_active: schedule.is_active,
        }
    }
}

/// Schedule creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// Window start.
    pub start_time: Option<DateTime<Utc>>,
    /// Window end. Omit for open-ended.
    pub end_time: Option<DateTime<Utc>>,
    /// Image shown during the window.
    pub target_image_url: Option<String>,
    /// Transition style. Defaults to the renderer default.
    pub transition: Option<Transition>,
    /// Whether the entry starts active. Defaults to true.
    pub is_active: Option<bool>,
}

/// List the schedules attached to a QRON, earliest window first.
pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;
    let schedules = state.store.list_schedules(&qron.id)?;
    Ok(Json(schedules.iter().map(ScheduleResponse::from).collect()))
}

/// Attach a schedule to a QRON.
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let start_time = body
        .start_time
        .ok_or_else(|| ApiError::BadRequest("Missing required field: startTime".into()))?;

    let target_image_url = body
        .target_image_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: targetImageUrl".into()))?;

    if let Some(end_time) = body.end_time {
        if end_time <= start_time {
            return Err(ApiError::BadRequest(
                "endTime must be after startTime".into(),
            ));
        }
    }

    let schedule = Schedule {
        id: ScheduleId::generate(),
        qron_id: qron.id,
        user_id: auth.user_id,
        start_time,
        end_time: body.end_time,
        target_image_url: target_image_url.to_string(),
        transition: body.transition.unwrap_or(Transition::Default),
        is_active: body.is_active.unwrap_or(true),
    };

    state.store.put_schedule(&schedule)?;

    tracing::info!(
        user_id = %auth.user_id,
        qron_id = %qron.id,
        schedule_id = %schedule.id,
        "Schedule created"
    );

    Ok(Json(ScheduleResponse::from(&schedule)))
}

/// Remove a schedule from a QRON.
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((id, schedule_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let schedule_id: ScheduleId = schedule_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("schedule not found: {schedule_id}")))?;

    state.store.delete_schedule(&qron.id, &schedule_id)?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
