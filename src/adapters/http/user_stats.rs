//! The per-unit user statistics report.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::domain::models::{PeriodType, UnitStatLine};
use crate::domain::ports::AuthUser;

use super::error::ApiError;
use super::params;
use super::state::AppState;
use super::units::UnitResponse;

/// Query parameters for the report. All three are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserStatsParams {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Comparison period: week, month, year or all
    #[serde(default, rename = "type")]
    pub period: Option<String>,
}

/// One report line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserStatResponse {
    pub unit: UnitResponse,
    pub percentage: f64,
    pub current_period: f64,
    pub last_period: f64,
}

impl From<UnitStatLine> for UserStatResponse {
    fn from(line: UnitStatLine) -> Self {
        Self {
            unit: line.unit.into(),
            percentage: line.percentage,
            current_period: line.current_period,
            last_period: line.last_period,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UserStatsResponse {
    pub stats: Vec<UserStatResponse>,
}

pub(super) async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserStatsParams>,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let start = params::required_date("startDate", query.start_date.as_deref())?;
    let end = params::required_date("endDate", query.end_date.as_deref())?;
    let window = params::window(start, end)?;

    let raw = params::required("type", query.period.as_deref())?;
    let period = PeriodType::from_str(raw)
        .ok_or_else(|| ApiError::validation(format!("unknown period type: {raw}")))?;

    let lines = state.stats.user_stats(user.user_id, window, period).await?;
    Ok(Json(UserStatsResponse {
        stats: lines.into_iter().map(UserStatResponse::from).collect(),
    }))
}
