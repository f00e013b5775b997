//! Question pool storage and calibration state

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{format_timestamp, parse_timestamp};
use crate::config::{clamp_limit, DEFAULT_QUESTION_LIMIT};
use crate::domain::{ItemStats, PooledQuestion, QuestionType, ReviewStatus};

impl ToSql for QuestionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for QuestionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        QuestionType::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("Invalid question type: {}", s).into()))
    }
}

impl ToSql for ReviewStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReviewStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        ReviewStatus::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("Invalid review status: {}", s).into()))
    }
}

const QUESTION_COLUMNS: &str = r#"
    question_hash, language, level, question_type, prompt, options, correct_answer,
    explanation, source_story_id, created_at,
    total_responses, correct_responses, timed_responses, avg_response_time_ms,
    distractor_counts, empirical_difficulty, discrimination, flagged,
    review_status, reviewed_at
"#;

/// Decode a JSON text column
fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Encode a value for a JSON text column
fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Convert a database row to PooledQuestion
fn row_to_question(row: &Row) -> Result<PooledQuestion> {
    let created_at: String = row.get(9)?;
    let reviewed_at: Option<String> = row.get(19)?;
    let flagged: i64 = row.get(17)?;

    Ok(PooledQuestion {
        question_hash: row.get(0)?,
        language: row.get(1)?,
        level: row.get(2)?,
        question_type: row.get(3)?,
        prompt: row.get(4)?,
        options: json_column(row, 5)?,
        correct_answer: row.get(6)?,
        explanation: row.get(7)?,
        source_story_id: row.get(8)?,
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        stats: ItemStats {
            total_responses: row.get(10)?,
            correct_responses: row.get(11)?,
            timed_responses: row.get(12)?,
            avg_response_time_ms: row.get(13)?,
            distractor_counts: json_column(row, 14)?,
            empirical_difficulty: row.get(15)?,
            discrimination: row.get(16)?,
            flagged: flagged != 0,
        },
        review_status: row.get(18)?,
        reviewed_at: reviewed_at.as_deref().and_then(parse_timestamp),
    })
}

/// Insert a new question. Fails on a duplicate hash.
pub fn insert_question(conn: &Connection, q: &PooledQuestion) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO questions (
      question_hash, language, level, question_type, prompt, options, correct_answer,
      explanation, source_story_id, created_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
        params![
            q.question_hash,
            q.language,
            q.level,
            q.question_type,
            q.prompt,
            to_json(&q.options)?,
            q.correct_answer,
            q.explanation,
            q.source_story_id,
            format_timestamp(&q.created_at),
        ],
    )?;
    Ok(())
}

/// Get a question by its content hash
pub fn get_question(conn: &Connection, hash: &str) -> Result<Option<PooledQuestion>> {
    conn.query_row(
        &format!("SELECT {} FROM questions WHERE question_hash = ?1", QUESTION_COLUMNS),
        params![hash],
        row_to_question,
    )
    .optional()
}

/// Filters for question listings. Unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionFilter {
    pub language: Option<String>,
    pub level: Option<String>,
    pub flagged: Option<bool>,
    pub review_status: Option<ReviewStatus>,
    pub limit: Option<i64>,
}

/// List questions matching a filter, newest first
pub fn list_questions(conn: &Connection, filter: &QuestionFilter) -> Result<Vec<PooledQuestion>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {}
    FROM questions
    WHERE (?1 IS NULL OR language = ?1)
      AND (?2 IS NULL OR level = ?2 COLLATE NOCASE)
      AND (?3 IS NULL OR flagged = ?3)
      AND (?4 IS NULL OR review_status = ?4)
    ORDER BY created_at DESC, question_hash
    LIMIT ?5
    "#,
        QUESTION_COLUMNS
    ))?;

    let limit = clamp_limit(filter.limit, DEFAULT_QUESTION_LIMIT);

    let questions = stmt
        .query_map(
            params![
                filter.language,
                filter.level,
                filter.flagged.map(|f| f as i64),
                filter.review_status,
                limit,
            ],
            row_to_question,
        )?
        .collect::<Result<Vec<_>>>()?;

    Ok(questions)
}

/// Flagged questions still awaiting review, most answered first
pub fn list_flagged(conn: &Connection, limit: i64) -> Result<Vec<PooledQuestion>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {}
    FROM questions
    WHERE flagged = 1 AND review_status = 'pending'
    ORDER BY total_responses DESC, question_hash
    LIMIT ?1
    "#,
        QUESTION_COLUMNS
    ))?;

    let questions = stmt
        .query_map(params![limit], row_to_question)?
        .collect::<Result<Vec<_>>>()?;

    Ok(questions)
}

/// The columns selection weighting needs, without the JSON payload columns
#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub question_hash: String,
    pub language: String,
    pub level: String,
    pub empirical_difficulty: Option<f64>,
}

/// Servable questions for a language (and optionally a level).
///
/// Retired questions never qualify; flagged ones only once a reviewer kept them.
pub fn get_selection_pool(
    conn: &Connection,
    language: &str,
    level: Option<&str>,
) -> Result<Vec<PoolEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT question_hash, language, level, empirical_difficulty
    FROM questions
    WHERE language = ?1
      AND (?2 IS NULL OR level = ?2 COLLATE NOCASE)
      AND (review_status = 'kept' OR (review_status = 'pending' AND flagged = 0))
    "#,
    )?;

    let entries = stmt
        .query_map(params![language, level], |row| {
            Ok(PoolEntry {
                question_hash: row.get(0)?,
                language: row.get(1)?,
                level: row.get(2)?,
                empirical_difficulty: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(entries)
}

/// Load full questions for a set of hashes, in the order given. Unknown hashes are skipped.
pub fn get_questions_by_hash(conn: &Connection, hashes: &[String]) -> Result<Vec<PooledQuestion>> {
    if hashes.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; hashes.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM questions WHERE question_hash IN ({})",
        QUESTION_COLUMNS, placeholders
    ))?;
    let mut found: HashMap<String, PooledQuestion> = stmt
        .query_map(params_from_iter(hashes.iter()), row_to_question)?
        .map(|q| q.map(|q| (q.question_hash.clone(), q)))
        .collect::<Result<_>>()?;

    Ok(hashes.iter().filter_map(|h| found.remove(h)).collect())
}

/// Persist updated calibration state for a question
pub fn save_item_stats(conn: &Connection, hash: &str, stats: &ItemStats) -> Result<usize> {
    conn.execute(
        r#"
    UPDATE questions
    SET total_responses = ?1,
        correct_responses = ?2,
        timed_responses = ?3,
        avg_response_time_ms = ?4,
        distractor_counts = ?5,
        empirical_difficulty = ?6,
        discrimination = ?7,
        flagged = ?8
    WHERE question_hash = ?9
    "#,
        params![
            stats.total_responses,
            stats.correct_responses,
            stats.timed_responses,
            stats.avg_response_time_ms,
            to_json(&stats.distractor_counts)?,
            stats.empirical_difficulty,
            stats.discrimination,
            stats.flagged as i64,
            hash,
        ],
    )
}

/// Record a reviewer decision. Returns false when the question does not exist.
pub fn set_review_status(conn: &Connection, hash: &str, status: ReviewStatus) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE questions SET review_status = ?1, reviewed_at = ?2 WHERE question_hash = ?3",
        params![status, format_timestamp(&Utc::now()), hash],
    )?;
    Ok(updated > 0)
}

/// Aggregate counts over the pool
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PoolStats {
    pub questions: i64,
    pub calibrated: i64,
    pub flagged: i64,
    pub retired: i64,
    pub total_responses: i64,
}

/// Pool statistics, optionally restricted to one language
pub fn get_pool_stats(conn: &Connection, language: Option<&str>) -> Result<PoolStats> {
    conn.query_row(
        r#"
    SELECT COUNT(*),
           COALESCE(SUM(CASE WHEN empirical_difficulty IS NOT NULL THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(flagged), 0),
           COALESCE(SUM(CASE WHEN review_status = 'retired' THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(total_responses), 0)
    FROM questions
    WHERE (?1 IS NULL OR language = ?1)
    "#,
        params![language],
        |row| {
            Ok(PoolStats {
                questions: row.get(0)?,
                calibrated: row.get(1)?,
                flagged: row.get(2)?,
                retired: row.get(3)?,
                total_responses: row.get(4)?,
            })
        },
    )
}
