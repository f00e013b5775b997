use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-learner ability estimate on the Rasch logit scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerAbility {
  pub user_id: String,
  pub ability: f64,
  pub responses: i64,
  pub updated_at: Option<DateTime<Utc>>,
}

impl LearnerAbility {
  /// A learner with no responses starts at average ability
  pub fn new(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      ability: 0.0,
      responses: 0,
      updated_at: None,
    }
  }
}
