use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  MultipleChoice,
  FillBlank,
  Translation,
  Listening,
  Reading,
}

impl QuestionType {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "multiple_choice" => Some(Self::MultipleChoice),
      "fill_blank" => Some(Self::FillBlank),
      "translation" => Some(Self::Translation),
      "listening" => Some(Self::Listening),
      "reading" => Some(Self::Reading),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multiple_choice",
      Self::FillBlank => "fill_blank",
      Self::Translation => "translation",
      Self::Listening => "listening",
      Self::Reading => "reading",
    }
  }

  /// Question types answered by picking one of the listed options
  pub fn has_options(&self) -> bool {
    matches!(self, Self::MultipleChoice | Self::Listening | Self::Reading)
  }
}

/// Reviewer decision for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
  /// Not reviewed (flagged items stay out of selection)
  #[default]
  Pending,
  /// Reviewed and kept in rotation even if flagged
  Kept,
  /// Removed from rotation
  Retired,
}

impl ReviewStatus {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(Self::Pending),
      "kept" => Some(Self::Kept),
      "retired" => Some(Self::Retired),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Kept => "kept",
      Self::Retired => "retired",
    }
  }
}

/// Running response statistics and derived IRT parameters for an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
  pub total_responses: i64,
  pub correct_responses: i64,
  /// Responses that reported a response time (denominator of the mean)
  pub timed_responses: i64,
  pub avg_response_time_ms: Option<f64>,
  pub empirical_difficulty: Option<f64>,
  pub discrimination: Option<f64>,
  pub flagged: bool,
  pub distractor_counts: BTreeMap<String, i64>,
}

impl ItemStats {
  /// Raw proportion of correct responses
  pub fn correct_rate(&self) -> Option<f64> {
    if self.total_responses > 0 {
      Some(self.correct_responses as f64 / self.total_responses as f64)
    } else {
      None
    }
  }
}

/// A single learner response to a pooled question
#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
  pub correct: bool,
  #[serde(default)]
  pub response_time_ms: Option<i64>,
  #[serde(default)]
  pub selected_option: Option<String>,
}

/// A question in the shared pool
#[derive(Debug, Clone, Serialize)]
pub struct PooledQuestion {
  pub question_hash: String,
  pub language: String,
  pub level: String,
  pub question_type: QuestionType,
  pub prompt: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub explanation: Option<String>,
  pub source_story_id: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub stats: ItemStats,
  pub review_status: ReviewStatus,
  pub reviewed_at: Option<DateTime<Utc>>,
}

impl PooledQuestion {
  /// Histogram key for a learner's selected answer.
  ///
  /// Option-based questions only accept one of their own options and key the
  /// histogram by the stored option text. Free-text answers are trimmed and
  /// cut to `MAX_ANSWER_LENGTH` characters; blank answers are not counted.
  pub fn histogram_key(&self, selected: &str) -> Result<Option<String>, QuestionError> {
    if self.question_type.has_options() {
      let wanted = normalize(selected);
      return self
        .options
        .iter()
        .find(|o| normalize(o) == wanted)
        .map(|o| Some(o.clone()))
        .ok_or(QuestionError::UnknownOption);
    }

    let trimmed = selected.trim();
    if trimmed.is_empty() {
      return Ok(None);
    }
    Ok(Some(trimmed.chars().take(config::MAX_ANSWER_LENGTH).collect()))
  }
}

/// Submitted question content before it enters the pool
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
  pub language: String,
  pub level: String,
  pub question_type: QuestionType,
  pub prompt: String,
  #[serde(default)]
  pub options: Vec<String>,
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: Option<String>,
  #[serde(default)]
  pub source_story_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionError {
  UnknownLanguage(String),
  UnknownLevel(String, String),
  EmptyPrompt,
  EmptyAnswer,
  MissingOptions,
  AnswerNotInOptions,
  UnknownOption,
}

impl std::fmt::Display for QuestionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      QuestionError::UnknownLanguage(lang) => write!(f, "Unsupported language: {}", lang),
      QuestionError::UnknownLevel(lang, level) => {
        write!(f, "Level '{}' is not defined for {}", level, lang)
      }
      QuestionError::EmptyPrompt => write!(f, "Question prompt is empty"),
      QuestionError::EmptyAnswer => write!(f, "Correct answer is empty"),
      QuestionError::MissingOptions => write!(f, "Question type requires at least two options"),
      QuestionError::AnswerNotInOptions => write!(f, "Correct answer is not among the options"),
      QuestionError::UnknownOption => write!(f, "Selected option is not one of the question's options"),
    }
  }
}

impl std::error::Error for QuestionError {}

/// Normalize text for hashing: NFC, trimmed, lowercase
fn normalize(text: &str) -> String {
  text.trim().nfc().collect::<String>().to_lowercase()
}

impl NewQuestion {
  /// Check the question against the language table and its own shape
  pub fn validate(&self) -> Result<(), QuestionError> {
    if config::get_language(&self.language).is_none() {
      return Err(QuestionError::UnknownLanguage(self.language.clone()));
    }
    if config::level_index(&self.language, &self.level).is_none() {
      return Err(QuestionError::UnknownLevel(
        self.language.clone(),
        self.level.clone(),
      ));
    }
    if self.prompt.trim().is_empty() {
      return Err(QuestionError::EmptyPrompt);
    }
    if self.correct_answer.trim().is_empty() {
      return Err(QuestionError::EmptyAnswer);
    }
    if self.question_type.has_options() {
      if self.options.len() < 2 {
        return Err(QuestionError::MissingOptions);
      }
      let answer = normalize(&self.correct_answer);
      if !self.options.iter().any(|o| normalize(o) == answer) {
        return Err(QuestionError::AnswerNotInOptions);
      }
    }
    Ok(())
  }

  /// Content hash used to deduplicate the pool.
  ///
  /// Options are hashed in sorted order so reshuffled copies collapse into one item.
  pub fn content_hash(&self) -> String {
    let mut options: Vec<String> = self.options.iter().map(|o| normalize(o)).collect();
    options.sort();

    let input = format!(
      "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
      normalize(&self.language),
      self.question_type.as_str(),
      normalize(&self.prompt),
      normalize(&self.correct_answer),
      options.join("\u{1e}"),
    );
    let hash = Sha256::digest(input.as_bytes());
    hex::encode(&hash[..16])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> NewQuestion {
    NewQuestion {
      language: "japanese".to_string(),
      level: "N5".to_string(),
      question_type: QuestionType::MultipleChoice,
      prompt: "「みず」の意味は？".to_string(),
      options: vec![
        "water".to_string(),
        "fire".to_string(),
        "tree".to_string(),
        "sky".to_string(),
      ],
      correct_answer: "water".to_string(),
      explanation: None,
      source_story_id: None,
    }
  }

  #[test]
  fn test_question_type_roundtrip() {
    for qt in [
      QuestionType::MultipleChoice,
      QuestionType::FillBlank,
      QuestionType::Translation,
      QuestionType::Listening,
      QuestionType::Reading,
    ] {
      assert_eq!(QuestionType::from_str(qt.as_str()), Some(qt));
    }
    assert_eq!(QuestionType::from_str("essay"), None);
  }

  #[test]
  fn test_review_status_serde() {
    let status: ReviewStatus = serde_json::from_str("\"retired\"").unwrap();
    assert_eq!(status, ReviewStatus::Retired);
    assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
  }

  #[test]
  fn test_valid_question() {
    assert_eq!(sample().validate(), Ok(()));
  }

  #[test]
  fn test_unknown_language_rejected() {
    let mut q = sample();
    q.language = "klingon".to_string();
    assert!(matches!(q.validate(), Err(QuestionError::UnknownLanguage(_))));
  }

  #[test]
  fn test_level_must_match_language() {
    let mut q = sample();
    q.level = "B1".to_string();
    assert!(matches!(q.validate(), Err(QuestionError::UnknownLevel(_, _))));
  }

  #[test]
  fn test_answer_must_be_an_option() {
    let mut q = sample();
    q.correct_answer = "rain".to_string();
    assert_eq!(q.validate(), Err(QuestionError::AnswerNotInOptions));
  }

  #[test]
  fn test_fill_blank_needs_no_options() {
    let mut q = sample();
    q.question_type = QuestionType::FillBlank;
    q.options.clear();
    assert_eq!(q.validate(), Ok(()));
  }

  #[test]
  fn test_blank_prompt_rejected() {
    let mut q = sample();
    q.prompt = "   ".to_string();
    assert_eq!(q.validate(), Err(QuestionError::EmptyPrompt));
  }

  #[test]
  fn test_hash_ignores_option_order_and_case() {
    let a = sample();
    let mut b = sample();
    b.options.reverse();
    b.correct_answer = " Water ".to_string();
    assert_eq!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash().len(), 32);
  }

  #[test]
  fn test_hash_differs_for_different_prompts() {
    let a = sample();
    let mut b = sample();
    b.prompt = "「ひ」の意味は？".to_string();
    assert_ne!(a.content_hash(), b.content_hash());
  }

  fn pooled(question_type: QuestionType, options: &[&str]) -> PooledQuestion {
    PooledQuestion {
      question_hash: "h".to_string(),
      language: "japanese".to_string(),
      level: "N5".to_string(),
      question_type,
      prompt: "p".to_string(),
      options: options.iter().map(|o| o.to_string()).collect(),
      correct_answer: "water".to_string(),
      explanation: None,
      source_story_id: None,
      created_at: Utc::now(),
      stats: ItemStats::default(),
      review_status: ReviewStatus::Pending,
      reviewed_at: None,
    }
  }

  #[test]
  fn test_histogram_key_matches_stored_option() {
    let q = pooled(QuestionType::MultipleChoice, &["Water", "fire"]);
    assert_eq!(q.histogram_key("  water ").unwrap(), Some("Water".to_string()));
    assert_eq!(q.histogram_key("fire").unwrap(), Some("fire".to_string()));
    assert_eq!(q.histogram_key("lava"), Err(QuestionError::UnknownOption));
  }

  #[test]
  fn test_histogram_key_free_text_trimmed_and_capped() {
    let q = pooled(QuestionType::Translation, &[]);
    assert_eq!(q.histogram_key("  agua ").unwrap(), Some("agua".to_string()));
    assert_eq!(q.histogram_key("   ").unwrap(), None);

    let long = "あ".repeat(config::MAX_ANSWER_LENGTH + 50);
    let key = q.histogram_key(&long).unwrap().unwrap();
    assert_eq!(key.chars().count(), config::MAX_ANSWER_LENGTH);
  }
}
