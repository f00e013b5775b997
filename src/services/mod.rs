//! Question pool workflows built on the repository functions in `db`.
//!
//! Each workflow takes a plain connection so handlers and tests share one
//! code path; multi-write workflows run inside a single transaction.

pub mod pool;
pub mod responses;
pub mod selection;

pub use pool::{add_question, review_question};
pub use responses::{record_response, ResponseOutcome};
pub use selection::{select_for_learner, Selection};

use crate::domain::QuestionError;

/// Failure of a pool workflow
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before touching the database
    Invalid(String),
    /// Referenced question does not exist
    NotFound(String),
    Database(rusqlite::Error),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Invalid(msg) => write!(f, "Invalid request: {}", msg),
            ServiceError::NotFound(hash) => write!(f, "Question not found: {}", hash),
            ServiceError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Database(e)
    }
}

impl From<QuestionError> for ServiceError {
    fn from(e: QuestionError) -> Self {
        ServiceError::Invalid(e.to_string())
    }
}

/// Longest accepted learner identifier
const MAX_USER_ID_LEN: usize = 128;

/// Learner identifiers are opaque but must be non-empty and bounded
pub(crate) fn validate_user_id(user_id: &str) -> Result<&str, ServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Invalid("user_id is required".to_string()));
    }
    if trimmed.len() > MAX_USER_ID_LEN {
        return Err(ServiceError::Invalid(format!(
            "user_id longer than {} bytes",
            MAX_USER_ID_LEN
        )));
    }
    Ok(trimmed)
}
