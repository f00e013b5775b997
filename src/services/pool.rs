//! Adding questions to the shared pool and recording reviewer decisions.
//!
//! The pool doubles as a content library: submitting a question whose
//! content hash already exists returns the stored item instead of creating
//! a duplicate, so generated content is reused across learners.

use chrono::Utc;
use rusqlite::Connection;

use super::ServiceError;
use crate::db;
use crate::domain::{ItemStats, NewQuestion, PooledQuestion, ReviewStatus};

/// Add a question, or return the existing copy.
///
/// Returns the pooled question and whether it was reused.
pub fn add_question(
    conn: &Connection,
    new: NewQuestion,
) -> Result<(PooledQuestion, bool), ServiceError> {
    new.validate()?;

    let hash = new.content_hash();
    if let Some(existing) = db::get_question(conn, &hash)? {
        tracing::debug!("Reusing pooled question {}", hash);
        return Ok((existing, true));
    }

    let question = PooledQuestion {
        question_hash: hash,
        language: new.language,
        level: new.level.to_uppercase(),
        question_type: new.question_type,
        prompt: new.prompt.trim().to_string(),
        options: new.options.iter().map(|o| o.trim().to_string()).collect(),
        correct_answer: new.correct_answer.trim().to_string(),
        explanation: new.explanation,
        source_story_id: new.source_story_id,
        created_at: Utc::now(),
        stats: ItemStats::default(),
        review_status: ReviewStatus::Pending,
        reviewed_at: None,
    };
    db::insert_question(conn, &question)?;
    tracing::info!(
        "Added {} question {} ({} {})",
        question.question_type.as_str(),
        question.question_hash,
        question.language,
        question.level
    );

    Ok((question, false))
}

/// Store a reviewer decision and return the updated question
pub fn review_question(
    conn: &Connection,
    hash: &str,
    status: ReviewStatus,
) -> Result<PooledQuestion, ServiceError> {
    if !db::set_review_status(conn, hash, status)? {
        return Err(ServiceError::NotFound(hash.to_string()));
    }
    tracing::info!("Question {} marked {}", hash, status.as_str());

    db::get_question(conn, hash)?.ok_or_else(|| ServiceError::NotFound(hash.to_string()))
}
