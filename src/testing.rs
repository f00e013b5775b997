//! Test utilities for database setup.
//!
//! Provides helpers that reuse the authoritative schema initialization,
//! eliminating schema duplication in test code.

use chrono::Utc;
use rusqlite::Connection;
use tempfile::TempDir;

use crate::domain::{ItemStats, NewQuestion, PooledQuestion, QuestionType, ReviewStatus};

/// Test environment with a migrated database in a temporary directory.
///
/// The directory is removed when the environment is dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with the full schema (all migrations)
    pub conn: Connection,
}

impl TestEnv {
    /// Create a test environment using `crate::db::schema::run_migrations()`.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("lingua.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }
}

/// Build a multiple-choice question whose hash is unique per prompt.
pub fn sample_question(language: &str, level: &str, prompt: &str) -> PooledQuestion {
    let new = NewQuestion {
        language: language.to_string(),
        level: level.to_string(),
        question_type: QuestionType::MultipleChoice,
        prompt: prompt.to_string(),
        options: vec![
            "water".to_string(),
            "fire".to_string(),
            "tree".to_string(),
            "sky".to_string(),
        ],
        correct_answer: "water".to_string(),
        explanation: None,
        source_story_id: None,
    };

    PooledQuestion {
        question_hash: new.content_hash(),
        language: new.language,
        level: new.level,
        question_type: new.question_type,
        prompt: new.prompt,
        options: new.options,
        correct_answer: new.correct_answer,
        explanation: new.explanation,
        source_story_id: new.source_story_id,
        created_at: Utc::now(),
        stats: ItemStats::default(),
        review_status: ReviewStatus::Pending,
        reviewed_at: None,
    }
}
