use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a question served to a learner and how they answered.
///
/// Exposures are append-only; they feed variety in selection and audits
/// of item calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exposure {
  pub id: i64,
  pub user_id: String,
  pub question_hash: String,
  pub served_at: DateTime<Utc>,
  pub is_correct: bool,
  /// Learner ability (logit scale) before this response was applied
  pub user_ability_at_time: f64,
}

impl Exposure {
  pub fn new(user_id: &str, question_hash: &str, is_correct: bool, ability: f64) -> Self {
    Self {
      id: 0,
      user_id: user_id.to_string(),
      question_hash: question_hash.to_string(),
      served_at: Utc::now(),
      is_correct,
      user_ability_at_time: ability,
    }
  }
}
