//! Unit endpoints: catalog administration and per-unit statistics.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{
    DayCount, DayTotal, DayValue, NewUnit, Unit, UnitStatistics, UnitUpdate,
};
use crate::domain::ports::AuthUser;
use crate::domain::time::format_utc;

use super::error::ApiError;
use super::params;
use super::state::AppState;

/// A unit as returned on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UnitResponse {
    pub id: Uuid,
    pub name: String,
    pub plural_name: Option<String>,
    pub completed_word: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Unit> for UnitResponse {
    fn from(unit: Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name,
            plural_name: unit.plural_name,
            completed_word: unit.completed_word,
            created_at: format_utc(unit.created_at),
            updated_at: format_utc(unit.updated_at),
        }
    }
}

/// Request to create a unit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateUnitRequest {
    pub name: String,
    #[serde(default)]
    pub plural_name: Option<String>,
    #[serde(default)]
    pub completed_word: Option<String>,
}

/// Request to edit a unit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateUnitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plural_name: Option<String>,
    #[serde(default)]
    pub completed_word: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct UnitListResponse {
    pub units: Vec<UnitResponse>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedUnitResponse {
    pub unit: UnitResponse,
}

/// Query parameters for unit statistics. All three are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UnitStatsParams {
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub start_utc: Option<String>,
    #[serde(default)]
    pub end_utc: Option<String>,
}

/// The requested window, echoed back in UTC.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DateRange {
    pub start_utc: String,
    pub end_utc: String,
}

/// Per-goal total over the window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalTotalResponse {
    pub goal_id: Uuid,
    pub goal_title: String,
    pub total_progress: f64,
}

/// The four chart series for one unit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UnitCharts {
    pub progress_over_time: Vec<DayValue>,
    pub cumulative_progress: Vec<DayTotal>,
    pub activity_count: Vec<DayCount>,
    pub progress_by_goal: Vec<GoalTotalResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UnitStatisticsResponse {
    pub unit_id: Uuid,
    pub range: DateRange,
    pub charts: UnitCharts,
}

impl From<UnitStatistics> for UnitStatisticsResponse {
    fn from(stats: UnitStatistics) -> Self {
        Self {
            unit_id: stats.unit_id,
            range: DateRange {
                start_utc: format_utc(stats.start),
                end_utc: format_utc(stats.end),
            },
            charts: UnitCharts {
                progress_over_time: stats.progress_over_time,
                cumulative_progress: stats.cumulative_progress,
                activity_count: stats.activity_count,
                progress_by_goal: stats
                    .progress_by_goal
                    .into_iter()
                    .map(|g| GoalTotalResponse {
                        goal_id: g.goal_id,
                        goal_title: g.goal_title,
                        total_progress: g.total_progress,
                    })
                    .collect(),
            },
        }
    }
}

pub(super) async fn list_units(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<UnitListResponse>, ApiError> {
    let units = state.units.list_units().await?;
    Ok(Json(UnitListResponse {
        units: units.into_iter().map(UnitResponse::from).collect(),
    }))
}

pub(super) async fn create_unit(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Json(req): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<CreatedUnitResponse>), ApiError> {
    let unit = state
        .units
        .create_unit(NewUnit {
            name: req.name,
            plural_name: req.plural_name,
            completed_word: req.completed_word,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedUnitResponse { unit: unit.into() })))
}

pub(super) async fn update_unit(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUnitRequest>,
) -> Result<Json<UnitResponse>, ApiError> {
    let update = UnitUpdate {
        name: req.name,
        plural_name: req.plural_name,
        completed_word: req.completed_word,
    };
    let unit = state.units.update_unit(id, update).await?;
    Ok(Json(unit.into()))
}

pub(super) async fn delete_unit(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.units.delete_unit(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn unit_statistics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UnitStatsParams>,
) -> Result<Json<UnitStatisticsResponse>, ApiError> {
    let unit_id = params::required_uuid("unitId", query.unit_id.as_deref())?;
    let start = params::required_date("startUtc", query.start_utc.as_deref())?;
    let end = params::required_date("endUtc", query.end_utc.as_deref())?;
    let window = params::window(start, end)?;

    let stats = state.stats.unit_statistics(user.user_id, unit_id, window).await?;
    Ok(Json(stats.into()))
}
