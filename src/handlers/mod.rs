pub mod admin;
pub mod error;
pub mod extract;
pub mod learners;
pub mod questions;
pub mod reading;
pub mod stories;
pub mod vocabulary;

pub use error::ApiError;
pub use extract::{JsonBody, QueryParams};

use axum::{
  routing::{get, post},
  Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{LanguageInfo, LANGUAGES};
use crate::state::AppState;

/// Build the API router
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/languages", get(languages))
    // Question pool
    .route(
      "/api/questions",
      get(questions::list_questions).post(questions::create_question),
    )
    .route("/api/questions/{hash}", get(questions::get_question))
    .route("/api/questions/{hash}/responses", post(questions::submit_response))
    .route("/api/questions/{hash}/exposures", get(questions::question_exposures))
    // Learners
    .route("/api/learners/{user_id}", get(learners::get_learner))
    .route("/api/learners/{user_id}/next", get(learners::next_questions))
    .route("/api/learners/{user_id}/exposures", get(learners::recent_exposures))
    // Review queue
    .route("/api/admin/flagged", get(admin::list_flagged))
    .route("/api/admin/questions/{hash}/review", post(admin::review_question))
    .route("/api/admin/stats", get(admin::pool_stats))
    // Stories
    .route("/api/stories", get(stories::list_stories))
    .route("/api/stories/reload", post(stories::reload_stories))
    .route("/api/stories/{id}", get(stories::get_story))
    .route("/api/stories/{id}/vocabulary", get(stories::story_vocabulary))
    .route("/api/vocabulary/validate", post(vocabulary::validate))
    // Reading aids
    .route("/api/tokenize", post(reading::tokenize))
    .route("/api/dictionary/search/{query}", get(reading::search_dictionary))
    .route("/api/dictionary/{word}", get(reading::lookup_word))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
  Json(serde_json::json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// GET /api/languages
pub async fn languages() -> Json<&'static [LanguageInfo]> {
  Json(&LANGUAGES)
}
