pub mod exposure;
pub mod learner;
pub mod question;

pub use exposure::Exposure;
pub use learner::LearnerAbility;
pub use question::{
  ItemResponse, ItemStats, NewQuestion, PooledQuestion, QuestionError, QuestionType, ReviewStatus,
};
