//! Pool maintenance endpoints: the flagged review queue and pool statistics.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::questions::LimitQuery;
use super::{ApiError, JsonBody, QueryParams};
use crate::config::{clamp_limit, DEFAULT_QUESTION_LIMIT};
use crate::db::{self, PoolStats};
use crate::domain::{PooledQuestion, ReviewStatus};
use crate::services;
use crate::state::AppState;

/// Flagged questions awaiting a decision, most answered first.
///
/// GET /api/admin/flagged?limit=
pub async fn list_flagged(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> Result<Json<Vec<PooledQuestion>>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    let limit = clamp_limit(query.limit, DEFAULT_QUESTION_LIMIT);
    Ok(Json(db::list_flagged(&conn, limit)?))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Keep,
    Retire,
}

impl From<ReviewDecision> for ReviewStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Keep => ReviewStatus::Kept,
            ReviewDecision::Retire => ReviewStatus::Retired,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

/// Keep a flagged question in rotation or retire it.
///
/// POST /api/admin/questions/{hash}/review
pub async fn review_question(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    JsonBody(request): JsonBody<ReviewRequest>,
) -> Result<Json<PooledQuestion>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    let question = services::review_question(&conn, &hash, request.decision.into())?;
    Ok(Json(question))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub language: Option<String>,
}

/// GET /api/admin/stats?language=
pub async fn pool_stats(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StatsQuery>,
) -> Result<Json<PoolStats>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    Ok(Json(db::get_pool_stats(&conn, query.language.as_deref())?))
}
