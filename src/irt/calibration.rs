//! Item calibration from binary response data.
//!
//! Each response updates the running counters of an item. Once enough
//! responses exist, Rasch-style parameters are re-estimated from the full
//! historical correct-rate:
//! - difficulty `b = -ln(p / (1 - p))`
//! - discrimination proxy `a = 8 p (1 - p)`, peaking at 2.0 when `p = 0.5`
//!
//! `p` is clamped to `[P_CLAMP_MIN, P_CLAMP_MAX]` so the logit stays finite.

use crate::config::{
  DIFFICULTY_MIN_RESPONSES, DISCRIMINATION_MIN_RESPONSES, FLAG_MIN_DISCRIMINATION, FLAG_P_HIGH,
  FLAG_P_LOW, P_CLAMP_MAX, P_CLAMP_MIN,
};
use crate::domain::{ItemResponse, ItemStats};

/// Correct-rate clamped into the range where logits are finite
pub fn clamped_p(correct: i64, total: i64) -> f64 {
  if total <= 0 {
    return 0.5;
  }
  (correct as f64 / total as f64).clamp(P_CLAMP_MIN, P_CLAMP_MAX)
}

/// Rasch difficulty: negative log-odds of a correct response
pub fn logit_difficulty(p: f64) -> f64 {
  -(p / (1.0 - p)).ln()
}

/// Discrimination proxy that peaks at 2.0 for p = 0.5 and vanishes at the extremes
pub fn discrimination_proxy(p: f64) -> f64 {
  8.0 * p * (1.0 - p)
}

/// Items too easy, too hard, or not discriminating need human review.
///
/// An unset discrimination never flags.
pub fn should_flag(p: f64, discrimination: Option<f64>) -> bool {
  p < FLAG_P_LOW || p > FLAG_P_HIGH || discrimination.is_some_and(|a| a < FLAG_MIN_DISCRIMINATION)
}

/// Running mean `avg + (sample - avg) / n`, where `n` already includes the sample
fn running_mean(old: Option<f64>, sample: f64, n: i64) -> f64 {
  match old {
    Some(avg) if n > 1 => avg + (sample - avg) / n as f64,
    _ => sample,
  }
}

/// Apply one response to an item's statistics.
///
/// Counters only grow. Derived parameters are recomputed from the full
/// history once their response threshold is met; below it they keep
/// whatever value they already had (unset for a fresh item).
pub fn apply_response(stats: &ItemStats, response: &ItemResponse) -> ItemStats {
  let mut next = stats.clone();

  next.total_responses += 1;
  if response.correct {
    next.correct_responses += 1;
  }

  if let Some(ms) = response.response_time_ms.filter(|ms| *ms >= 0) {
    next.timed_responses += 1;
    next.avg_response_time_ms = Some(running_mean(
      stats.avg_response_time_ms,
      ms as f64,
      next.timed_responses,
    ));
  }

  if let Some(option) = response.selected_option.as_deref() {
    *next.distractor_counts.entry(option.to_string()).or_insert(0) += 1;
  }

  if next.total_responses >= DIFFICULTY_MIN_RESPONSES {
    let p = clamped_p(next.correct_responses, next.total_responses);
    next.empirical_difficulty = Some(logit_difficulty(p));

    if next.total_responses >= DISCRIMINATION_MIN_RESPONSES {
      next.discrimination = Some(discrimination_proxy(p));
    }

    next.flagged = should_flag(p, next.discrimination);
  }

  next
}
