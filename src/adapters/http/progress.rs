//! Progress endpoints: event recording and per-goal history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{DailyProgress, ProgressEntry};
use crate::domain::ports::AuthUser;
use crate::domain::time::format_utc;

use super::error::ApiError;
use super::goals::GoalResponse;
use super::state::AppState;

/// Request to record one progress event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordProgressRequest {
    pub goal_id: Uuid,
    /// Increment amount; ignored for manual goals
    #[serde(default)]
    pub progress: Option<f64>,
}

/// One ledger row on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProgressEntryResponse {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub progress: Option<f64>,
    pub created_at: String,
}

impl From<ProgressEntry> for ProgressEntryResponse {
    fn from(entry: ProgressEntry) -> Self {
        Self {
            id: entry.id,
            goal_id: entry.goal_id,
            progress: entry.progress,
            created_at: format_utc(entry.created_at),
        }
    }
}

/// The appended row plus the goal state it produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordProgressResponse {
    pub goal_progress: ProgressEntryResponse,
    pub goal: GoalResponse,
}

/// Day-bucketed history of one goal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalHistoryResponse {
    pub historical_data: Vec<DailyProgress>,
}

pub(super) async fn record_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RecordProgressRequest>,
) -> Result<(StatusCode, Json<RecordProgressResponse>), ApiError> {
    let recorded = state
        .progress
        .record_progress(user.user_id, req.goal_id, req.progress)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordProgressResponse {
            goal_progress: recorded.entry.into(),
            goal: recorded.goal.into(),
        }),
    ))
}

pub(super) async fn goal_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalHistoryResponse>, ApiError> {
    let historical_data = state.progress.goal_history(user.user_id, id).await?;
    Ok(Json(GoalHistoryResponse { historical_data }))
}
