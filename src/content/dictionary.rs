//! Word lookup over exported dictionaries.
//!
//! One compact JSON file per language, named by ISO code (`ja.json`,
//! `en.json`, `fr.json`) and ordered most frequent first. Japanese rows are
//! `[word, reading, [meanings]]`; the others are `[word, [meanings], pos?]`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

use crate::config::{self, EXACT_LOOKUP_ENTRIES, MAX_DICTIONARY_RESULTS, MEANINGS_PER_ENTRY};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    pub reading: String,
    pub meanings: Vec<String>,
    pub part_of_speech: Option<String>,
}

/// Row shapes of the exported files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Row {
    Japanese(String, String, Vec<String>),
    WithPos(String, Vec<String>, String),
    Plain(String, Vec<String>),
}

impl From<Row> for DictionaryEntry {
    fn from(row: Row) -> Self {
        let (word, reading, meanings, pos) = match row {
            Row::Japanese(word, reading, meanings) => (word, reading, meanings, None),
            Row::WithPos(word, meanings, pos) => (word, String::new(), meanings, Some(pos)),
            Row::Plain(word, meanings) => (word, String::new(), meanings, None),
        };
        DictionaryEntry {
            word,
            reading,
            meanings: meanings.into_iter().take(MEANINGS_PER_ENTRY).collect(),
            part_of_speech: pos.map(|p| expand_pos(&p)),
        }
    }
}

/// Short WordNet-style tags as exported, spelled out
fn expand_pos(tag: &str) -> String {
    match tag {
        "n" => "noun",
        "v" => "verb",
        "adj" | "a" | "s" => "adjective",
        "adv" | "r" => "adverb",
        other => other,
    }
    .to_string()
}

#[derive(Debug)]
pub enum DictionaryError {
    UnknownLanguage(String),
}

impl std::fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionaryError::UnknownLanguage(lang) => write!(f, "Unsupported language: {}", lang),
        }
    }
}

impl std::error::Error for DictionaryError {}

/// Dictionaries for every language with an export on disk
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: HashMap<&'static str, Vec<DictionaryEntry>>,
}

/// Lookup key: NFC, trimmed and lowercased
fn fold(text: &str) -> String {
    text.trim().nfc().collect::<String>().to_lowercase()
}

impl Dictionary {
    /// Read `<iso>.json` for each supported language. Missing or broken
    /// files leave that language empty.
    pub fn load(dir: &Path) -> Self {
        let mut dictionary = Self::default();

        for language in config::LANGUAGES.iter() {
            let path = dir.join(format!("{}.json", language.iso_code));
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Dictionary not found: {}", path.display());
                    continue;
                }
            };

            match serde_json::from_str::<Vec<Row>>(&text) {
                Ok(rows) => {
                    tracing::info!("Loaded {} {} dictionary entries", rows.len(), language.code);
                    dictionary
                        .entries
                        .insert(language.code, rows.into_iter().map(DictionaryEntry::from).collect());
                }
                Err(e) => tracing::warn!("Skipping dictionary {}: {}", path.display(), e),
            }
        }

        dictionary
    }

    /// Build from in-memory entries
    pub fn from_entries(language: &str, entries: Vec<DictionaryEntry>) -> Self {
        let mut dictionary = Self::default();
        if let Some(info) = config::get_language(language) {
            dictionary.entries.insert(info.code, entries);
        }
        dictionary
    }

    pub fn is_loaded(&self, language: &str) -> bool {
        self.entries.get(language).is_some_and(|e| !e.is_empty())
    }

    fn language_entries(&self, language: &str) -> Result<&[DictionaryEntry], DictionaryError> {
        if config::get_language(language).is_none() {
            return Err(DictionaryError::UnknownLanguage(language.to_string()));
        }
        Ok(self.entries.get(language).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Exact match on the word (or, for Japanese, its reading).
    ///
    /// Japanese returns up to `EXACT_LOOKUP_ENTRIES` homographs; other
    /// languages return the single most frequent match.
    pub fn lookup(&self, word: &str, language: &str) -> Result<Vec<DictionaryEntry>, DictionaryError> {
        let key = fold(word);
        let cap = if language == "japanese" { EXACT_LOOKUP_ENTRIES } else { 1 };

        Ok(self
            .language_entries(language)?
            .iter()
            .filter(|e| fold(&e.word) == key || (!e.reading.is_empty() && e.reading == key))
            .take(cap)
            .cloned()
            .collect())
    }

    /// Prefix search, most frequent first, one entry per word
    pub fn search(
        &self,
        query: &str,
        language: &str,
        limit: usize,
    ) -> Result<Vec<DictionaryEntry>, DictionaryError> {
        let entries = self.language_entries(language)?;
        let prefix = fold(query);
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, MAX_DICTIONARY_RESULTS);

        let mut seen = HashSet::new();
        Ok(entries
            .iter()
            .filter(|e| fold(&e.word).starts_with(&prefix) || e.reading.starts_with(&prefix))
            .filter(|e| seen.insert(e.word.clone()))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(word: &str, reading: &str, meaning: &str) -> DictionaryEntry {
        DictionaryEntry {
            word: word.to_string(),
            reading: reading.to_string(),
            meanings: vec![meaning.to_string()],
            part_of_speech: None,
        }
    }

    #[test]
    fn test_load_export_formats() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ja.json"),
            r#"[["水","みず",["water","fluid","liquid"]],["水曜日","すいようび",["Wednesday"]]]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("en.json"),
            r#"[["water",["binary compound"],"n"],["wane",["decrease"]]]"#,
        )
        .unwrap();
        fs::write(dir.path().join("fr.json"), "{ broken").unwrap();

        let dict = Dictionary::load(dir.path());
        assert!(dict.is_loaded("japanese"));
        assert!(dict.is_loaded("english"));
        assert!(!dict.is_loaded("french"));

        let ja = dict.lookup("水", "japanese").unwrap();
        assert_eq!(ja.len(), 1);
        assert_eq!(ja[0].reading, "みず");
        assert_eq!(ja[0].meanings, vec!["water", "fluid"]);

        let en = dict.lookup("Water", "english").unwrap();
        assert_eq!(en[0].part_of_speech.as_deref(), Some("noun"));
        assert_eq!(dict.lookup("wane", "english").unwrap()[0].part_of_speech, None);
    }

    #[test]
    fn test_lookup_by_reading() {
        let dict = Dictionary::from_entries(
            "japanese",
            vec![entry("水", "みず", "water"), entry("見ず", "みず", "without seeing")],
        );
        let hits = dict.lookup("みず", "japanese").unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_prefix_dedup_and_limit() {
        let dict = Dictionary::from_entries(
            "english",
            vec![
                entry("water", "", "a"),
                entry("water", "", "b"),
                entry("waterfall", "", "c"),
                entry("wax", "", "d"),
                entry("fire", "", "e"),
            ],
        );
        let hits = dict.search("WAT", "english", 10).unwrap();
        let words: Vec<&str> = hits.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["water", "waterfall"]);

        assert_eq!(dict.search("wa", "english", 1).unwrap().len(), 1);
        assert!(dict.search("  ", "english", 10).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_language() {
        let dict = Dictionary::default();
        assert!(matches!(
            dict.search("a", "klingon", 5),
            Err(DictionaryError::UnknownLanguage(_))
        ));
        assert!(dict.lookup("a", "french").unwrap().is_empty());
    }
}
