//! Vocabulary level check for arbitrary token lists.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{ApiError, JsonBody};
use crate::content::Token;
use crate::state::AppState;
use crate::validation::ValidationResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub tokens: Vec<Token>,
    #[serde(alias = "level")]
    pub target_level: String,
}

/// Invalid levels are reported in the result message rather than as an
/// HTTP error, matching how stored validation results look.
///
/// POST /api/vocabulary/validate
pub async fn validate(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ValidateRequest>,
) -> Result<Json<ValidationResult>, ApiError> {
    let tokens: Vec<&Token> = request.tokens.iter().collect();
    Ok(Json(state.vocabulary.validate_tokens(&tokens, &request.target_level)))
}
