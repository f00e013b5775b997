//! Learner ability estimation on the Rasch logit scale.
//!
//! Ability moves toward the observed outcome by the prediction error
//! `x - P(θ, b)`, with a step that shrinks as the learner accumulates
//! responses (large corrections early, stable estimates later).

use crate::config::{self, ABILITY_MAX, ABILITY_MIN, ABILITY_MIN_STEP, PRIOR_SPREAD};
use crate::domain::PooledQuestion;

/// Probability of a correct response under the Rasch model
pub fn expected_probability(ability: f64, difficulty: f64) -> f64 {
  1.0 / (1.0 + (-(ability - difficulty)).exp())
}

/// Update step for a learner with `responses` prior answers
pub fn step_size(responses: i64) -> f64 {
  (1.0 / ((responses.max(0) + 1) as f64).sqrt()).max(ABILITY_MIN_STEP)
}

/// New ability after answering an item of the given difficulty
pub fn update_ability(ability: f64, responses: i64, difficulty: f64, correct: bool) -> f64 {
  let actual = if correct { 1.0 } else { 0.0 };
  let expected = expected_probability(ability, difficulty);
  (ability + step_size(responses) * (actual - expected)).clamp(ABILITY_MIN, ABILITY_MAX)
}

/// Difficulty prior for an uncalibrated item, from its level's position.
///
/// The easiest level maps to `-PRIOR_SPREAD`, the hardest to `+PRIOR_SPREAD`.
/// Unknown levels sit at 0.
pub fn prior_difficulty(language: &str, level: &str) -> f64 {
  let levels = match config::get_language(language) {
    Some(info) => info.levels.len(),
    None => return 0.0,
  };
  match config::level_index(language, level) {
    Some(idx) if levels > 1 => -PRIOR_SPREAD + 2.0 * PRIOR_SPREAD * idx as f64 / (levels - 1) as f64,
    _ => 0.0,
  }
}

/// Empirical difficulty when calibrated, the level prior otherwise
pub fn difficulty_or_prior(empirical: Option<f64>, language: &str, level: &str) -> f64 {
  empirical.unwrap_or_else(|| prior_difficulty(language, level))
}

/// Difficulty used for ability updates and selection
pub fn item_difficulty(question: &PooledQuestion) -> f64 {
  difficulty_or_prior(
    question.stats.empirical_difficulty,
    &question.language,
    &question.level,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_expected_probability_at_equal_ability() {
    assert!((expected_probability(1.3, 1.3) - 0.5).abs() < 1e-12);
  }

  #[test]
  fn test_expected_probability_monotonic() {
    assert!(expected_probability(1.0, 0.0) > expected_probability(0.0, 0.0));
    assert!(expected_probability(0.0, 1.0) < 0.5);
  }

  #[test]
  fn test_step_size_shrinks() {
    assert!((step_size(0) - 1.0).abs() < 1e-12);
    assert!(step_size(3) < step_size(0));
    assert!((step_size(10_000) - ABILITY_MIN_STEP).abs() < 1e-12);
  }

  #[test]
  fn test_correct_answer_raises_ability() {
    assert!(update_ability(0.0, 5, 0.0, true) > 0.0);
    assert!(update_ability(0.0, 5, 0.0, false) < 0.0);
  }

  #[test]
  fn test_surprising_outcome_moves_more() {
    // Failing an easy item costs more than failing a hard one
    let fail_easy = update_ability(0.0, 5, -2.0, false);
    let fail_hard = update_ability(0.0, 5, 2.0, false);
    assert!(fail_easy < fail_hard);
  }

  #[test]
  fn test_ability_clamped() {
    let mut ability = 0.0;
    for n in 0..500 {
      ability = update_ability(ability, n, 10.0, true);
    }
    assert!(ability <= ABILITY_MAX);
    assert!(ability > 3.0);
  }

  #[test]
  fn test_prior_difficulty_spread() {
    assert!((prior_difficulty("japanese", "N5") + PRIOR_SPREAD).abs() < 1e-12);
    assert!((prior_difficulty("japanese", "N1") - PRIOR_SPREAD).abs() < 1e-12);
    assert!(prior_difficulty("japanese", "N3").abs() < 1e-12);
    assert!(prior_difficulty("french", "A2") < prior_difficulty("french", "B1"));
    assert_eq!(prior_difficulty("klingon", "A1"), 0.0);
    assert_eq!(prior_difficulty("english", "Z9"), 0.0);
  }
}
