//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use crate::catalog::MissionFilter;
use crate::domain::{Category, Difficulty};
use crate::error::AppError;
use crate::logic::{get_profile, get_progress, register, submit};
use crate::protocol::*;
use crate::routes::auth::AuthUser;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

fn parse_filter(q: &MissionQuery) -> Result<MissionFilter, AppError> {
  let category = match q.category.as_deref().filter(|s| !s.is_empty()) {
    Some(s) => Some(Category::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown category: {s}")))?),
    None => None,
  };
  let difficulty = match q.difficulty.as_deref().filter(|s| !s.is_empty()) {
    Some(s) => Some(Difficulty::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown difficulty: {s}")))?),
    None => None,
  };
  Ok(MissionFilter { category, difficulty })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_missions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<MissionQuery>,
) -> Result<Json<Vec<MissionSummaryOut>>, AppError> {
  let filter = parse_filter(&q)?;
  let out: Vec<MissionSummaryOut> = state.catalog.list(filter).into_iter().map(Into::into).collect();
  info!(target: "mission", count = out.len(), "HTTP missions listed");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_mission(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<MissionDetailOut>, AppError> {
  let mission = state.catalog.find_by_id(&id).ok_or_else(|| AppError::mission_not_found(&id))?;
  Ok(Json(to_detail_out(mission)))
}

#[instrument(level = "info", skip(state, body), fields(user = %user.0, answers = body.answers.len()))]
pub async fn http_submit_mission(
  State(state): State<Arc<AppState>>,
  user: AuthUser,
  Path(id): Path<String>,
  Json(body): Json<SubmitIn>,
) -> Result<Json<SubmitOut>, AppError> {
  let out = submit(&state, &user.0, &id, body.answers, Utc::now()).await?;
  info!(target: "mission", %id, score = out.score, xp = out.xp_earned, already = out.already_completed, "HTTP submission evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  user: AuthUser,
) -> Result<Json<ProgressOut>, AppError> {
  get_progress(&state, &user.0).await.map(Json)
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  user: AuthUser,
) -> Result<Json<ProfileOut>, AppError> {
  get_profile(&state, &user.0).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> Result<impl IntoResponse, AppError> {
  let profile = register(&state, body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}
