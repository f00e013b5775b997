//! Question pool endpoints: add, browse, answer and audit questions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, JsonBody, QueryParams};
use crate::config::{clamp_limit, DEFAULT_EXPOSURE_LIMIT};
use crate::db::{self, QuestionFilter};
use crate::domain::{Exposure, ItemResponse, NewQuestion, PooledQuestion};
use crate::services::{self, ResponseOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateQuestionResponse {
    pub question: PooledQuestion,
    /// True when identical content was already pooled
    pub reused: bool,
}

/// Add a question to the pool, or return the pooled copy of identical content.
///
/// POST /api/questions
pub async fn create_question(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewQuestion>,
) -> Result<impl IntoResponse, ApiError> {
    let conn = db::try_lock(&state.db)?;
    let (question, reused) = services::add_question(&conn, new)?;

    let status = if reused { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(CreateQuestionResponse { question, reused })))
}

/// GET /api/questions?language=&level=&flagged=&review_status=&limit=
pub async fn list_questions(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<QuestionFilter>,
) -> Result<Json<Vec<PooledQuestion>>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    Ok(Json(db::list_questions(&conn, &filter)?))
}

/// GET /api/questions/{hash}
pub async fn get_question(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<PooledQuestion>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    db::get_question(&conn, &hash)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Question not found: {}", hash)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub user_id: String,
    pub correct: bool,
    #[serde(default)]
    pub response_time_ms: Option<i64>,
    #[serde(default)]
    pub selected_option: Option<String>,
}

/// Record a learner's answer: calibrates the item, updates the learner's
/// ability and logs the exposure.
///
/// POST /api/questions/{hash}/responses
pub async fn submit_response(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    JsonBody(request): JsonBody<SubmitResponseRequest>,
) -> Result<Json<ResponseOutcome>, ApiError> {
    let response = ItemResponse {
        correct: request.correct,
        response_time_ms: request.response_time_ms,
        selected_option: request.selected_option,
    };

    let mut conn = db::try_lock(&state.db)?;
    let outcome = services::record_response(&mut conn, &hash, &request.user_id, &response)?;
    Ok(Json(outcome))
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Exposure history of a question, most recent first.
///
/// GET /api/questions/{hash}/exposures?limit=
pub async fn question_exposures(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> Result<Json<Vec<Exposure>>, ApiError> {
    let conn = db::try_lock(&state.db)?;
    if db::get_question(&conn, &hash)?.is_none() {
        return Err(ApiError::NotFound(format!("Question not found: {}", hash)));
    }

    let limit = clamp_limit(query.limit, DEFAULT_EXPOSURE_LIMIT);
    Ok(Json(db::get_question_exposures(&conn, &hash, limit)?))
}
