//! Story catalog endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use super::{ApiError, QueryParams};
use crate::content::{Story, StoryCatalog, StoryListItem};
use crate::state::AppState;
use crate::validation::ValidationResult;

#[derive(Debug, Default, Deserialize)]
pub struct LevelQuery {
    pub level: Option<String>,
}

fn read_catalog(state: &AppState) -> Result<RwLockReadGuard<'_, StoryCatalog>, ApiError> {
    state.stories.read().map_err(|_| {
        tracing::error!("Story catalog lock poisoned");
        ApiError::Unavailable
    })
}

fn write_catalog(state: &AppState) -> Result<RwLockWriteGuard<'_, StoryCatalog>, ApiError> {
    state.stories.write().map_err(|_| {
        tracing::error!("Story catalog lock poisoned");
        ApiError::Unavailable
    })
}

fn story_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Story not found: {}", id))
}

/// GET /api/stories?level=
pub async fn list_stories(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LevelQuery>,
) -> Result<Json<Vec<StoryListItem>>, ApiError> {
    let catalog = read_catalog(&state)?;
    Ok(Json(catalog.list(query.level.as_deref())))
}

/// GET /api/stories/{id}
pub async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let catalog = read_catalog(&state)?;
    catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| story_not_found(&id))
}

/// Re-read the stories directory.
///
/// POST /api/stories/reload
pub async fn reload_stories(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut catalog = write_catalog(&state)?;
    let loaded = catalog.reload();
    Ok(Json(serde_json::json!({ "loaded": loaded })))
}

/// Check a story's vocabulary against its own level, or `?level=` when given.
///
/// GET /api/stories/{id}/vocabulary?level=
pub async fn story_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<LevelQuery>,
) -> Result<Json<ValidationResult>, ApiError> {
    let catalog = read_catalog(&state)?;
    let story = catalog.get(&id).ok_or_else(|| story_not_found(&id))?;

    let level = query
        .level
        .as_deref()
        .unwrap_or(&story.metadata.jlpt_level);
    let result = state.vocabulary.validate_tokens(&story.tokens(), level);

    tracing::debug!("Story {} vocabulary check: {}", id, result.message);
    Ok(Json(result))
}
