//! Goal endpoints: CRUD, manual completion and creation-window counts.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{Goal, GoalType, GoalUpdate, NewGoal};
use crate::domain::ports::{AuthUser, GoalFilter, PageRequest};
use crate::domain::time::format_utc;

use super::error::ApiError;
use super::params;
use super::state::AppState;

/// A goal as returned on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_goal_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub unit_id_completed: Option<Uuid>,
    pub unit_completed_amount: Option<f64>,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub target: Option<f64>,
    pub current_progress: Option<f64>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Direct children, present only on container goal detail responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GoalResponse>>,
}

impl From<Goal> for GoalResponse {
    fn from(g: Goal) -> Self {
        Self {
            id: g.id,
            user_id: g.user_id,
            parent_goal_id: g.parent_goal_id,
            unit_id: g.unit_id,
            unit_id_completed: g.unit_id_completed,
            unit_completed_amount: g.unit_completed_amount,
            title: g.title,
            description: g.description,
            goal_type: g.goal_type.as_str().to_string(),
            target: g.target,
            current_progress: g.current_progress,
            completed_at: g.completed_at.map(format_utc),
            created_at: format_utc(g.created_at),
            updated_at: format_utc(g.updated_at),
            children: None,
        }
    }
}

impl GoalResponse {
    fn with_children(goal: Goal, children: Vec<Goal>) -> Self {
        let mut response = Self::from(goal);
        response.children = Some(children.into_iter().map(Self::from).collect());
        response
    }
}

/// Request to create a goal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateGoalRequest {
    pub title: String,
    pub goal_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_goal_id: Option<Uuid>,
    #[serde(default)]
    pub unit_id: Option<Uuid>,
    #[serde(default)]
    pub unit_id_completed: Option<Uuid>,
    #[serde(default)]
    pub unit_completed_amount: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
}

/// Request to edit a goal's title or description.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateGoalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query parameters for the goal list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListGoalsParams {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub roots_only: Option<bool>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query parameters carrying a required creation window.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WindowParams {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// One page of goals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalListResponse {
    pub data: Vec<GoalResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedGoalResponse {
    pub goal: GoalResponse,
}

/// Goal counts over a creation window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalStatisticsResponse {
    pub total_goals: i64,
    pub total_completed_goals: i64,
    pub pending_goals: i64,
}

fn parse_goal_type(raw: &str) -> Result<GoalType, ApiError> {
    GoalType::from_str(raw)
        .ok_or_else(|| ApiError::validation(format!("unknown goal type: {raw}")))
}

pub(super) async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListGoalsParams>,
) -> Result<Json<GoalListResponse>, ApiError> {
    let mut filter = GoalFilter::for_user(user.user_id);
    if let Some(raw) = query.start_date.as_deref() {
        filter.created_from = Some(params::parse_date("startDate", raw)?);
    }
    if let Some(raw) = query.end_date.as_deref() {
        filter.created_to = Some(params::parse_date("endDate", raw)?);
    }
    if let Some(raw) = query.goal_type.as_deref() {
        filter.goal_type = Some(parse_goal_type(raw)?);
    }
    filter.search = query.search;
    filter.completed = query.completed;
    filter.roots_only = query.roots_only.unwrap_or(false);

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };

    let result = state.goals.list_goals(filter, page).await?;
    Ok(Json(GoalListResponse {
        data: result.data.into_iter().map(GoalResponse::from).collect(),
        total: result.total,
        page: result.page,
        limit: result.limit,
        has_more: result.has_more,
    }))
}

pub(super) async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<CreatedGoalResponse>), ApiError> {
    let goal_type = parse_goal_type(&req.goal_type)?;
    let goal = state
        .goals
        .create_goal(NewGoal {
            user_id: user.user_id,
            parent_goal_id: req.parent_goal_id,
            unit_id: req.unit_id,
            unit_id_completed: req.unit_id_completed,
            unit_completed_amount: req.unit_completed_amount,
            title: req.title,
            description: req.description,
            goal_type,
            target: req.target,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedGoalResponse { goal: goal.into() })))
}

pub(super) async fn get_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError> {
    let (goal, children) = state.goals.get_goal(user.user_id, id).await?;
    let response = if goal.goal_type.is_container() {
        GoalResponse::with_children(goal, children)
    } else {
        GoalResponse::from(goal)
    };
    Ok(Json(response))
}

pub(super) async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let update = GoalUpdate { title: req.title, description: req.description };
    let goal = state.goals.update_goal(user.user_id, id, update).await?;
    Ok(Json(goal.into()))
}

pub(super) async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.goals.delete_goal(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn toggle_completion(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = state.goals.toggle_completion(user.user_id, id).await?;
    Ok(Json(goal.into()))
}

pub(super) async fn goal_statistics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<WindowParams>,
) -> Result<Json<GoalStatisticsResponse>, ApiError> {
    let start = params::required_date("startDate", query.start_date.as_deref())?;
    let end = params::required_date("endDate", query.end_date.as_deref())?;
    let window = params::window(start, end)?;

    let counts = state.goals.statistics(user.user_id, window).await?;
    Ok(Json(GoalStatisticsResponse {
        total_goals: counts.total_goals,
        total_completed_goals: counts.completed_goals,
        pending_goals: counts.pending_goals(),
    }))
}
