//! Project path functions - single source of truth for default file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Explicit `DATABASE_PATH`, `STORIES_DIR`, `WORD_LISTS_DIR`, `DICTIONARIES_DIR` and
//! `IPADIC_DIR` settings
//! (see config.rs) take precedence over these defaults.

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path
pub fn db_path() -> String {
    format!("{}/lingua.db", data_dir())
}

/// Directory holding story JSON files
pub fn stories_dir() -> String {
    format!("{}/stories", data_dir())
}

/// Directory holding JLPT word lists (n5.txt .. n1.txt)
pub fn word_lists_dir() -> String {
    format!("{}/jlpt", data_dir())
}

/// Directory holding exported dictionaries (ja.json, en.json, fr.json)
pub fn dictionaries_dir() -> String {
    format!("{}/dictionaries", data_dir())
}

/// Compiled IPADIC dictionary used by the tokenizer
pub fn ipadic_dir() -> String {
    format!("{}/ipadic", data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    // OnceLock initializes once, so only the default layout is checked here.

    #[test]
    fn test_data_dir_default() {
        let dir = data_dir();
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_db_path_format() {
        assert!(db_path().ends_with("/lingua.db"));
    }

    #[test]
    fn test_content_dirs() {
        assert!(stories_dir().ends_with("/stories"));
        assert!(word_lists_dir().ends_with("/jlpt"));
        assert!(dictionaries_dir().ends_with("/dictionaries"));
        assert!(ipadic_dir().ends_with("/ipadic"));
    }
}
