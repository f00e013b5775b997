pub mod ability;
pub mod calibration;
pub mod selector;

pub use ability::{
  difficulty_or_prior, expected_probability, item_difficulty, prior_difficulty, update_ability,
};
pub use calibration::apply_response;
pub use selector::{Candidate, calculate_all_weights, weighted_sample};
