//! Vocabulary level validation for graded readers (Learning Value Score).
//!
//! A good reader at level Nx should:
//! - give the learner enough Nx words to learn from
//! - keep words above Nx rare
//! - avoid vocabulary that appears in no list at all
//!
//! Thresholds are counts of unique words that scale with the text length in
//! tokens, so longer stories are allowed (and expected) to carry more.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use crate::config::VALIDATION_EXAMPLE_WORDS;
use crate::content::Token;

// ============================================================================
// Level tables
// ============================================================================

/// JLPT levels from easiest to hardest
pub static JLPT_LEVELS: &[&str] = &["N5", "N4", "N3", "N2", "N1"];

/// Minimum unique words AT the target level: `base + tokens / scale`
static MIN_TARGET_WORDS: &[(usize, usize)] = &[(2, 150), (3, 120), (4, 100), (5, 80), (6, 80)];

/// Maximum unique words ABOVE the target level. N1 has no limit.
static MAX_ABOVE_WORDS: &[Option<(usize, usize)>] = &[
  Some((5, 100)),
  Some((10, 50)),
  Some((10, 50)),
  Some((10, 50)),
  None,
];

/// Maximum unknown words: `8 + tokens / 100`
const UNKNOWN_WORDS_BASE: usize = 8;
const UNKNOWN_WORDS_SCALE: usize = 100;

/// Particles, punctuation, numerals, grammatical endings and everyday words.
/// They appear at every level and never count toward any threshold.
static IGNORED_WORDS: &[&str] = &[
  // Particles
  "は", "が", "を", "に", "で", "と", "も", "の", "へ", "から", "まで", "より", "や", "か", "ね",
  "よ", "な", "わ", "さ", "ぞ", "ぜ", "け", "こそ", "だけ", "しか", "ばかり",
  // Punctuation
  "。", "、", "！", "？", "「", "」", "『", "』", "…", "ー", "・",
  // Numbers
  "一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "百", "千", "万",
  // Basic verbs and demonstratives
  "する", "いる", "ある", "なる", "できる", "くる", "いく", "みる", "くれる", "もらう", "この",
  "その", "あの", "どの", "これ", "それ", "あれ", "どれ", "ここ", "そこ", "あそこ", "どこ",
  "こう", "そう", "ああ", "どう",
  // Auxiliaries and endings
  "です", "ます", "た", "て", "ない", "ば", "う", "よう", "だ", "だろう", "でしょう", "れる",
  "られる", "せる", "させる", "たい", "ほしい", "ぬ", "ん", "ている", "てある", "ておく",
  "てしまう", "ていく", "てくる", "しまう", "し", "ながら", "たり", "つつ",
  // Grammatical patterns
  "ので", "のに", "のは", "のが", "のを", "について", "として", "によって", "において",
  "という", "ということ", "というのは",
  // Adverbs and expressions
  "とても", "すごく", "本当に", "もう", "まだ", "もっと", "ちょっと", "すぐ", "ずっと",
  "たくさん", "少し", "全然", "絶対", "きっと", "たぶん", "やっぱり", "やはり",
  // Conjunctions
  "そして", "でも", "しかし", "だから", "けれど", "けど", "または", "あるいは",
  // Time and counters
  "時", "日", "年", "月", "週", "分", "秒", "回", "度", "番", "目", "時間", "今日", "明日",
  "昨日", "毎日", "毎週", "毎月", "毎年",
  // Everyday nouns and approximations
  "人", "物", "事", "所", "方", "前", "後", "中", "上", "下", "外", "内", "ぐらい", "くらい",
  "ころ", "頃", "ため", "まま", "ほう",
];

/// Whether a word is written only in katakana (loanwords).
///
/// Covers ァ (U+30A1) through ヶ (U+30F6) plus the long vowel mark ー.
pub fn is_katakana(word: &str) -> bool {
  !word.is_empty()
    && word
      .chars()
      .all(|c| ('\u{30A1}'..='\u{30F6}').contains(&c) || c == '\u{30FC}')
}

fn level_index(level: &str) -> Option<usize> {
  JLPT_LEVELS.iter().position(|l| *l == level)
}

// ============================================================================
// Result types
// ============================================================================

/// Outcome of checking a text against a target level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub total_tokens: usize,
  pub unique_words: usize,
  /// Unique words per level, plus `unknown` and `katakana`
  pub words_by_level: BTreeMap<String, usize>,

  pub target_level_count: usize,
  pub above_level_count: usize,
  pub unknown_count: usize,

  pub min_target_threshold: i64,
  /// -1 means no limit
  pub max_above_threshold: i64,
  pub max_unknown_threshold: i64,

  pub has_learning_value: bool,
  pub not_too_hard: bool,
  pub not_too_obscure: bool,
  pub passed: bool,

  /// Share of unique words at or below the target level
  pub readability_score: f64,
  pub target_level: String,
  pub message: String,

  pub target_level_words: Vec<String>,
  pub above_level_words: Vec<String>,
  pub unknown_words: Vec<String>,
}

impl ValidationResult {
  /// Result with no counts and every check set to `passed`
  fn empty(total_tokens: usize, target_level: &str, passed: bool, message: String) -> Self {
    Self {
      total_tokens,
      unique_words: 0,
      words_by_level: BTreeMap::new(),
      target_level_count: 0,
      above_level_count: 0,
      unknown_count: 0,
      min_target_threshold: 0,
      max_above_threshold: 0,
      max_unknown_threshold: 0,
      has_learning_value: passed,
      not_too_hard: passed,
      not_too_obscure: passed,
      passed,
      readability_score: if passed { 1.0 } else { 0.0 },
      target_level: target_level.to_string(),
      message,
      target_level_words: Vec::new(),
      above_level_words: Vec::new(),
      unknown_words: Vec::new(),
    }
  }
}

// ============================================================================
// Validator
// ============================================================================

/// JLPT word lists, one set per level.
///
/// Each `nX.txt` file holds the words introduced at that level, one per line.
#[derive(Debug, Clone, Default)]
pub struct VocabularyValidator {
  /// Words introduced at each level, indexed like `JLPT_LEVELS`
  level_words: Vec<HashSet<String>>,
  loaded: bool,
}

impl VocabularyValidator {
  /// Load `n5.txt` .. `n1.txt` from a directory.
  ///
  /// Missing files leave that level empty. When no file is found the
  /// validator skips every check.
  pub fn load(dir: &Path) -> Self {
    let mut level_words = Vec::with_capacity(JLPT_LEVELS.len());
    let mut loaded = false;

    for level in JLPT_LEVELS {
      let path = dir.join(format!("{}.txt", level.to_lowercase()));
      match fs::read_to_string(&path) {
        Ok(text) => {
          let words: HashSet<String> = text
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
          tracing::info!("Loaded {} words for {}", words.len(), level);
          level_words.push(words);
          loaded = true;
        }
        Err(_) => {
          tracing::warn!("Word list not found: {}", path.display());
          level_words.push(HashSet::new());
        }
      }
    }

    Self { level_words, loaded }
  }

  /// Build from in-memory lists ordered like `JLPT_LEVELS`
  pub fn from_lists(lists: &[&[&str]]) -> Self {
    let level_words: Vec<HashSet<String>> = (0..JLPT_LEVELS.len())
      .map(|i| {
        lists
          .get(i)
          .map(|words| words.iter().map(|w| w.to_string()).collect::<HashSet<String>>())
          .unwrap_or_default()
      })
      .collect();
    Self {
      level_words,
      loaded: !lists.is_empty(),
    }
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  /// Easiest level whose list contains the word
  pub fn word_level(&self, word: &str) -> Option<&'static str> {
    self
      .level_words
      .iter()
      .position(|words| words.contains(word))
      .map(|i| JLPT_LEVELS[i])
  }

  /// Check tokens against a target level (`N5`..`N1`, case-insensitive)
  pub fn validate_tokens(&self, tokens: &[&Token], target_level: &str) -> ValidationResult {
    let target_level = target_level.trim().to_uppercase();
    let Some(target_idx) = level_index(&target_level) else {
      return ValidationResult::empty(
        0,
        &target_level,
        false,
        format!("Invalid JLPT level: {}", target_level),
      );
    };

    if !self.loaded {
      tracing::warn!("Word lists not loaded - skipping validation");
      return ValidationResult::empty(
        0,
        &target_level,
        true,
        "Validation skipped - word lists not loaded".to_string(),
      );
    }

    let total_tokens = tokens.len();
    let words: BTreeSet<&str> = tokens
      .iter()
      .map(|t| t.lookup_form())
      .filter(|w| !w.is_empty() && !IGNORED_WORDS.contains(w))
      .collect();

    if words.is_empty() {
      return ValidationResult::empty(
        total_tokens,
        &target_level,
        true,
        "No words to validate".to_string(),
      );
    }

    let mut words_by_level: BTreeMap<String, usize> = JLPT_LEVELS
      .iter()
      .chain(["unknown", "katakana"].iter())
      .map(|l| (l.to_string(), 0))
      .collect();
    let mut target_words = Vec::new();
    let mut above_words = Vec::new();
    let mut below_count = 0usize;
    let mut unknown_words = Vec::new();

    for word in &words {
      let katakana = is_katakana(word);
      match self.word_level(word) {
        None if katakana => *words_by_level.entry("katakana".into()).or_default() += 1,
        None => {
          *words_by_level.entry("unknown".into()).or_default() += 1;
          unknown_words.push(word.to_string());
        }
        Some(level) => {
          *words_by_level.entry(level.to_string()).or_default() += 1;
          let idx = level_index(level).unwrap_or(target_idx);
          if idx == target_idx {
            target_words.push(word.to_string());
          } else if idx < target_idx {
            below_count += 1;
          } else if !katakana {
            above_words.push(word.to_string());
          }
        }
      }
    }

    let (base, scale) = MIN_TARGET_WORDS[target_idx];
    let min_target = (base + total_tokens / scale) as i64;
    let max_above = match MAX_ABOVE_WORDS[target_idx] {
      Some((base, scale)) => (base + total_tokens / scale) as i64,
      None => -1,
    };
    let max_unknown = (UNKNOWN_WORDS_BASE + total_tokens / UNKNOWN_WORDS_SCALE) as i64;

    let target_count = target_words.len();
    let above_count = above_words.len();
    let unknown_count = unknown_words.len();
    let unique_words = words.len();

    let has_learning_value = target_count as i64 >= min_target;
    let not_too_hard = max_above < 0 || above_count as i64 <= max_above;
    let not_too_obscure = unknown_count as i64 <= max_unknown;
    let passed = has_learning_value && not_too_hard && not_too_obscure;

    let readability = (target_count + below_count) as f64 / unique_words as f64;

    let message = if passed {
      format!("Story vocabulary is appropriate for {}", target_level)
    } else {
      let mut issues = Vec::new();
      if !has_learning_value {
        issues.push(format!(
          "not enough {} words ({}/{})",
          target_level, target_count, min_target
        ));
      }
      if !not_too_hard {
        issues.push(format!("too many above-level words ({}/{})", above_count, max_above));
      }
      if !not_too_obscure {
        issues.push(format!("too many unknown words ({}/{})", unknown_count, max_unknown));
      }
      format!("Story failed {} validation: {}", target_level, issues.join(", "))
    };

    target_words.truncate(VALIDATION_EXAMPLE_WORDS);
    above_words.truncate(VALIDATION_EXAMPLE_WORDS);
    unknown_words.truncate(VALIDATION_EXAMPLE_WORDS);

    ValidationResult {
      total_tokens,
      unique_words,
      words_by_level,
      target_level_count: target_count,
      above_level_count: above_count,
      unknown_count,
      min_target_threshold: min_target,
      max_above_threshold: max_above,
      max_unknown_threshold: max_unknown,
      has_learning_value,
      not_too_hard,
      not_too_obscure,
      passed,
      readability_score: (readability * 1000.0).round() / 1000.0,
      target_level,
      message,
      target_level_words: target_words,
      above_level_words: above_words,
      unknown_words,
    }
  }
}
