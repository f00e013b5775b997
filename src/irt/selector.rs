//! Adaptive question selection.
//!
//! Candidates are weighted by how much a response would tell us about the
//! learner:
//! - Rasch item information `P(1-P)` at the current ability (peaks when the
//!   learner has an even chance)
//! - a boost for items that have no empirical difficulty yet, so new items
//!   collect the responses they need to be calibrated
//! - a damping factor for items this learner has already seen

use rand::Rng;

use super::ability::expected_probability;
use crate::config::UNCALIBRATED_BOOST;

/// A question eligible for selection with the inputs its weight depends on
#[derive(Debug, Clone)]
pub struct Candidate {
  pub question_hash: String,
  pub difficulty: f64,
  pub calibrated: bool,
  /// How many times this learner has answered the question
  pub exposures: i64,
}

/// A candidate with its calculated selection weight
#[derive(Debug, Clone)]
pub struct CandidateWeight {
  pub question_hash: String,
  pub weight: f64,
}

/// Fisher information of a Rasch item at the given ability
pub fn item_information(ability: f64, difficulty: f64) -> f64 {
  let p = expected_probability(ability, difficulty);
  p * (1.0 - p)
}

/// Calculate the selection weight for a candidate
pub fn calculate_candidate_weight(ability: f64, candidate: &Candidate) -> f64 {
  let mut weight = item_information(ability, candidate.difficulty);

  if !candidate.calibrated {
    weight *= UNCALIBRATED_BOOST;
  }

  // Seen items fall off quickly: 1, 1/2, 1/3, ...
  weight /= (candidate.exposures.max(0) + 1) as f64;

  weight
}

/// Weigh every candidate
pub fn calculate_all_weights(ability: f64, candidates: &[Candidate]) -> Vec<CandidateWeight> {
  candidates
    .iter()
    .map(|c| CandidateWeight {
      question_hash: c.question_hash.clone(),
      weight: calculate_candidate_weight(ability, c),
    })
    .collect()
}

/// Pick one index by weight. Higher weight = more likely to be selected.
fn weighted_random_index<R: Rng + ?Sized>(weights: &[CandidateWeight], rng: &mut R) -> Option<usize> {
  if weights.is_empty() {
    return None;
  }
  if weights.len() == 1 {
    return Some(0);
  }

  let total_weight: f64 = weights.iter().map(|w| w.weight).sum();

  if !(total_weight > 0.0) || !total_weight.is_finite() {
    // Fallback to uniform if weights are invalid
    return Some(rng.random_range(0..weights.len()));
  }

  let mut target = rng.random_range(0.0..total_weight);
  for (idx, w) in weights.iter().enumerate() {
    target -= w.weight;
    if target <= 0.0 {
      return Some(idx);
    }
  }

  Some(weights.len() - 1)
}

/// Draw up to `count` distinct questions by weighted sampling without replacement
pub fn weighted_sample<R: Rng + ?Sized>(
  mut weights: Vec<CandidateWeight>,
  count: usize,
  rng: &mut R,
) -> Vec<String> {
  let mut picked = Vec::with_capacity(count.min(weights.len()));

  while picked.len() < count {
    match weighted_random_index(&weights, rng) {
      Some(idx) => picked.push(weights.swap_remove(idx).question_hash),
      None => break,
    }
  }

  picked
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn candidate(hash: &str, difficulty: f64, calibrated: bool, exposures: i64) -> Candidate {
    Candidate {
      question_hash: hash.to_string(),
      difficulty,
      calibrated,
      exposures,
    }
  }

  #[test]
  fn test_information_peaks_at_ability() {
    let at = item_information(0.5, 0.5);
    assert!((at - 0.25).abs() < 1e-12);
    assert!(item_information(0.5, 2.5) < at);
    assert!(item_information(0.5, -1.5) < at);
  }

  #[test]
  fn test_matched_item_outweighs_distant_item() {
    let near = calculate_candidate_weight(1.0, &candidate("a", 1.2, true, 0));
    let far = calculate_candidate_weight(1.0, &candidate("b", -3.0, true, 0));
    assert!(near > far);
  }

  #[test]
  fn test_uncalibrated_boost() {
    let calibrated = calculate_candidate_weight(0.0, &candidate("a", 0.0, true, 0));
    let fresh = calculate_candidate_weight(0.0, &candidate("b", 0.0, false, 0));
    assert!((fresh / calibrated - UNCALIBRATED_BOOST).abs() < 1e-12);
  }

  #[test]
  fn test_exposure_damping() {
    let unseen = calculate_candidate_weight(0.0, &candidate("a", 0.0, true, 0));
    let seen_twice = calculate_candidate_weight(0.0, &candidate("a", 0.0, true, 2));
    assert!((unseen / seen_twice - 3.0).abs() < 1e-12);
  }

  #[test]
  fn test_sample_distinct_and_bounded() {
    let weights = calculate_all_weights(
      0.0,
      &[
        candidate("a", 0.0, true, 0),
        candidate("b", 1.0, true, 0),
        candidate("c", -1.0, false, 1),
      ],
    );
    let mut rng = rand::rng();
    let picked = weighted_sample(weights, 10, &mut rng);
    assert_eq!(picked.len(), 3);
    let unique: HashSet<_> = picked.iter().collect();
    assert_eq!(unique.len(), 3);
  }

  #[test]
  fn test_sample_respects_count() {
    let weights = calculate_all_weights(
      0.0,
      &[candidate("a", 0.0, true, 0), candidate("b", 1.0, true, 0)],
    );
    let mut rng = rand::rng();
    assert_eq!(weighted_sample(weights, 1, &mut rng).len(), 1);
  }

  #[test]
  fn test_sample_empty() {
    let mut rng = rand::rng();
    assert!(weighted_sample(Vec::new(), 5, &mut rng).is_empty());
  }

  #[test]
  fn test_zero_weights_still_sample() {
    let weights = vec![
      CandidateWeight { question_hash: "a".to_string(), weight: 0.0 },
      CandidateWeight { question_hash: "b".to_string(), weight: 0.0 },
    ];
    let mut rng = rand::rng();
    assert_eq!(weighted_sample(weights, 2, &mut rng).len(), 2);
  }

  #[test]
  fn test_heavy_candidate_dominates() {
    let mut rng = rand::rng();
    let mut heavy_first = 0;
    for _ in 0..200 {
      let weights = vec![
        CandidateWeight { question_hash: "heavy".to_string(), weight: 1000.0 },
        CandidateWeight { question_hash: "light".to_string(), weight: 0.001 },
      ];
      if weighted_sample(weights, 1, &mut rng)[0] == "heavy" {
        heavy_first += 1;
      }
    }
    assert!(heavy_first > 190);
  }
}
