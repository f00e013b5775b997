//! Learner endpoints: ability estimate, adaptive question selection and
//! recent exposures.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::{ApiError, QueryParams};
use crate::config::{DEFAULT_SELECTION, RECENT_EXPOSURE_DAYS};
use crate::db;
use crate::domain::{Exposure, LearnerAbility};
use crate::services::{self, validate_user_id, Selection};
use crate::state::AppState;

/// Current ability estimate. Learners who have not answered anything get
/// the starting estimate.
///
/// GET /api/learners/{user_id}
pub async fn get_learner(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LearnerAbility>, ApiError> {
    let user_id = validate_user_id(&user_id)?;
    let conn = db::try_lock(&state.db)?;
    Ok(Json(db::get_learner_or_default(&conn, user_id)?))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub language: String,
    pub level: Option<String>,
    pub count: Option<usize>,
}

/// GET /api/learners/{user_id}/next?language=&level=&count=
pub async fn next_questions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    QueryParams(query): QueryParams<NextQuery>,
) -> Result<Json<Selection>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    let selection = services::select_for_learner(
        &conn,
        &user_id,
        &query.language,
        query.level.as_deref(),
        query.count.unwrap_or(DEFAULT_SELECTION),
    )?;
    Ok(Json(selection))
}

#[derive(Debug, Default, Deserialize)]
pub struct SinceQuery {
    /// RFC 3339 timestamp; defaults to the start of the recent-exposure window
    pub since: Option<DateTime<Utc>>,
}

/// A learner's exposures since a point in time, oldest first.
///
/// GET /api/learners/{user_id}/exposures?since=
pub async fn recent_exposures(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    QueryParams(query): QueryParams<SinceQuery>,
) -> Result<Json<Vec<Exposure>>, ApiError> {
    let user_id = validate_user_id(&user_id)?;
    let since = query
        .since
        .unwrap_or_else(|| Utc::now() - Duration::days(RECENT_EXPOSURE_DAYS));

    let conn = db::try_lock(&state.db)?;
    Ok(Json(db::get_recent_exposures(&conn, user_id, since)?))
}
