//! Reading aids: Japanese tokenization and dictionary lookup.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, JsonBody, QueryParams};
use crate::config::{DEFAULT_DICTIONARY_RESULTS, MAX_TOKENIZE_CHARS};
use crate::content::{DictionaryEntry, Token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TokenizeResponse {
    pub tokens: Vec<Token>,
    pub original: String,
}

/// Tokenize raw Japanese text into story tokens with furigana readings.
///
/// POST /api/tokenize
pub async fn tokenize(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TokenizeRequest>,
) -> Result<Json<TokenizeResponse>, ApiError> {
    let tokenizer = state
        .tokenizer
        .as_ref()
        .ok_or_else(|| ApiError::Unconfigured("Tokenizer dictionary not installed".to_string()))?;

    if request.text.chars().count() > MAX_TOKENIZE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Text exceeds {} characters",
            MAX_TOKENIZE_CHARS
        )));
    }

    let tokens = tokenizer.tokenize(&request.text)?;
    Ok(Json(TokenizeResponse {
        tokens,
        original: request.text,
    }))
}

fn default_language() -> String {
    "japanese".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DictionaryQuery {
    #[serde(default = "default_language")]
    pub language: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DictionaryResponse {
    pub entries: Vec<DictionaryEntry>,
}

/// Exact lookup.
///
/// GET /api/dictionary/{word}?language=
pub async fn lookup_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
    QueryParams(query): QueryParams<DictionaryQuery>,
) -> Result<Json<DictionaryResponse>, ApiError> {
    let entries = state.dictionary.lookup(&word, &query.language)?;
    Ok(Json(DictionaryResponse { entries }))
}

/// Prefix search for autocomplete.
///
/// GET /api/dictionary/search/{query}?language=&limit=
pub async fn search_dictionary(
    State(state): State<AppState>,
    Path(text): Path<String>,
    QueryParams(query): QueryParams<DictionaryQuery>,
) -> Result<Json<DictionaryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_DICTIONARY_RESULTS);
    let entries = state.dictionary.search(&text, &query.language, limit)?;
    Ok(Json(DictionaryResponse { entries }))
}
