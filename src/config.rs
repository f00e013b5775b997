//! Application configuration.
//!
//! File and environment settings are resolved once at startup with the
//! priority `config.toml` > environment (`.env` included) > defaults.
//! Tunable constants for calibration and selection live here as well.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    content: Option<ContentConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentConfig {
    stories_dir: Option<String>,
    word_lists_dir: Option<String>,
    dictionaries_dir: Option<String>,
    ipadic_dir: Option<String>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub server_addr: String,
    pub server_port: u16,
    pub stories_dir: PathBuf,
    pub word_lists_dir: PathBuf,
    pub dictionaries_dir: PathBuf,
    /// Compiled IPADIC directory for the Japanese tokenizer
    pub ipadic_dir: PathBuf,
}

impl Settings {
    /// Load settings with priority: config.toml > .env / environment > default
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring invalid config.toml: {}", e);
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = file
            .database
            .and_then(|db| db.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::db_path()));

        let (file_addr, file_port) = match file.server {
            Some(server) => (server.addr, server.port),
            None => (None, None),
        };
        let server_addr = file_addr.unwrap_or_else(|| SERVER_ADDR.to_string());
        let server_port = file_port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        let content = file.content.unwrap_or_default();
        let dir_setting = |file_value: Option<String>, key: &str, default: String| {
            file_value
                .or_else(|| env(key))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        let stories_dir = dir_setting(content.stories_dir, "STORIES_DIR", paths::stories_dir());
        let word_lists_dir =
            dir_setting(content.word_lists_dir, "WORD_LISTS_DIR", paths::word_lists_dir());
        let dictionaries_dir = dir_setting(
            content.dictionaries_dir,
            "DICTIONARIES_DIR",
            paths::dictionaries_dir(),
        );
        let ipadic_dir = dir_setting(content.ipadic_dir, "IPADIC_DIR", paths::ipadic_dir());

        Self {
            database_path,
            server_addr,
            server_port,
            stories_dir,
            word_lists_dir,
            dictionaries_dir,
            ipadic_dir,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

// ==================== Server Configuration ====================

/// Default address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Calibration Thresholds ====================

/// Responses needed before empirical difficulty is estimated
pub const DIFFICULTY_MIN_RESPONSES: i64 = 20;

/// Responses needed before discrimination is estimated
pub const DISCRIMINATION_MIN_RESPONSES: i64 = 50;

/// Correct-rate clamp used for logits
pub const P_CLAMP_MIN: f64 = 0.01;
pub const P_CLAMP_MAX: f64 = 0.99;

/// Items answered correctly less often than this are flagged as too hard
pub const FLAG_P_LOW: f64 = 0.10;

/// Items answered correctly more often than this are flagged as too easy
pub const FLAG_P_HIGH: f64 = 0.95;

/// Items discriminating less than this are flagged
pub const FLAG_MIN_DISCRIMINATION: f64 = 0.3;

// ==================== Learner Model ====================

/// Ability is kept on the logit scale within these bounds
pub const ABILITY_MIN: f64 = -4.0;
pub const ABILITY_MAX: f64 = 4.0;

/// Smallest ability update step once a learner has many responses
pub const ABILITY_MIN_STEP: f64 = 0.1;

/// Level priors for uncalibrated items are spread over [-PRIOR_SPREAD, PRIOR_SPREAD]
pub const PRIOR_SPREAD: f64 = 2.0;

// ==================== Selection ====================

/// Questions seen within this many days are skipped when possible
pub const RECENT_EXPOSURE_DAYS: i64 = 3;

/// Upper bound for questions returned by one selection
pub const MAX_SELECTION: usize = 50;

/// Default number of questions per selection
pub const DEFAULT_SELECTION: usize = 10;

/// Weight multiplier for items without an empirical difficulty
pub const UNCALIBRATED_BOOST: f64 = 1.5;

// ==================== Query Limits ====================

/// Default limit for question listings
pub const DEFAULT_QUESTION_LIMIT: i64 = 100;

/// Default limit for exposure history
pub const DEFAULT_EXPOSURE_LIMIT: i64 = 200;

/// Ceiling for any client-supplied `limit`
pub const MAX_QUERY_LIMIT: i64 = 1000;

/// Longest free-text answer kept in a distractor histogram
pub const MAX_ANSWER_LENGTH: usize = 200;

/// Example words kept per list in a vocabulary validation result
pub const VALIDATION_EXAMPLE_WORDS: usize = 20;

// ==================== Dictionary ====================

/// Default and maximum results for a dictionary prefix search
pub const DEFAULT_DICTIONARY_RESULTS: usize = 10;
pub const MAX_DICTIONARY_RESULTS: usize = 50;

/// Entries returned by an exact dictionary lookup
pub const EXACT_LOOKUP_ENTRIES: usize = 3;

/// Meanings kept per dictionary entry
pub const MEANINGS_PER_ENTRY: usize = 2;

/// Longest text accepted by the tokenizer endpoint
pub const MAX_TOKENIZE_CHARS: usize = 20_000;

/// Clamp a client-supplied listing limit
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_QUERY_LIMIT)
}

// ==================== Languages ====================

/// A content language learners can study
#[derive(Debug, serde::Serialize)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub iso_code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// Proficiency levels, easiest first
    pub levels: &'static [&'static str],
}

const CEFR_LEVELS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];

/// All supported content languages
pub static LANGUAGES: [LanguageInfo; 3] = [
    LanguageInfo {
        code: "japanese",
        iso_code: "ja",
        name: "Japanese",
        native_name: "日本語",
        levels: &["N5", "N4", "N3", "N2", "N1"],
    },
    LanguageInfo {
        code: "english",
        iso_code: "en",
        name: "English",
        native_name: "English",
        levels: CEFR_LEVELS,
    },
    LanguageInfo {
        code: "french",
        iso_code: "fr",
        name: "French",
        native_name: "Français",
        levels: CEFR_LEVELS,
    },
];

/// Get language info by code
pub fn get_language(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Position of a level within its language (0 = easiest)
pub fn level_index(language: &str, level: &str) -> Option<usize> {
    get_language(language)?
        .levels
        .iter()
        .position(|l| l.eq_ignore_ascii_case(level))
}
