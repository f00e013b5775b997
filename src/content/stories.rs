//! Graded-reader stories loaded from JSON files.
//!
//! Each story is one `*.json` file in the stories directory. Field names
//! are camelCase to match the files produced by the content pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Part of a token with an optional reading (furigana)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
}

/// A tokenized word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub surface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<TokenPart>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

impl Token {
    /// Dictionary form when known, otherwise the surface text
    pub fn lookup_form(&self) -> &str {
        match self.base_form.as_deref() {
            Some(base) if !base.is_empty() => base,
            _ => &self.surface,
        }
    }
}

/// Word-level audio timing (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A paragraph or line of dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSegment {
    pub id: String,
    pub segment_type: String,
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_words: Option<Vec<AudioWord>>,
}

/// A chapter. Files use either `id`/`title` or `chapterNumber`/`chapterTitle`,
/// and either `segments` or `content` for the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_tokens: Option<Vec<Token>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<ContentSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentSegment>>,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "audioURL", default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Chapter {
    /// Body segments from whichever field the file used
    pub fn all_segments(&self) -> &[ContentSegment] {
        match (&self.segments, &self.content) {
            (Some(s), _) if !s.is_empty() => s.as_slice(),
            (_, Some(c)) => c.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_tokens: Option<Vec<Token>>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_source: Option<String>,
    pub jlpt_level: String,
    pub word_count: u32,
    pub character_count: u32,
    pub genre: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_japanese: Option<String>,
    #[serde(rename = "coverImageURL", default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(rename = "audioURL", default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub created_date: String,
    #[serde(default)]
    pub is_premium: bool,
    /// Stored result of a previous vocabulary check, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_validation: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub metadata: StoryMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    /// Body of stories without chapters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar_points: Option<Vec<String>>,
}

impl Story {
    pub fn chapter_count(&self) -> usize {
        self.chapters.as_ref().map_or(0, Vec::len)
    }

    /// Every body token in reading order (story content, then chapters)
    pub fn tokens(&self) -> Vec<&Token> {
        let top = self.content.iter().flatten();
        let chapters = self
            .chapters
            .iter()
            .flatten()
            .flat_map(|c| c.all_segments().iter());

        top.chain(chapters).flat_map(|s| s.tokens.iter()).collect()
    }

    pub fn summary(&self) -> StoryListItem {
        StoryListItem {
            id: self.id.clone(),
            title: self.metadata.title.clone(),
            title_japanese: self.metadata.title_japanese.clone(),
            jlpt_level: self.metadata.jlpt_level.clone(),
            word_count: self.metadata.word_count,
            genre: self.metadata.genre.clone(),
            summary: self.metadata.summary.clone(),
            cover_image_url: self.metadata.cover_image_url.clone(),
            chapter_count: self.chapter_count(),
            is_premium: self.metadata.is_premium,
        }
    }
}

/// Listing entry for a story
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryListItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    pub jlpt_level: String,
    pub word_count: u32,
    pub genre: String,
    pub summary: String,
    #[serde(rename = "coverImageURL", skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub chapter_count: usize,
    pub is_premium: bool,
}

/// Story file errors.
#[derive(Debug)]
pub enum StoryLoadError {
    IoError(String, String),
    ParseError(String, String),
}

impl std::fmt::Display for StoryLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryLoadError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
            StoryLoadError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
        }
    }
}

impl std::error::Error for StoryLoadError {}

/// Parse a single story file.
pub fn load_story(path: &Path) -> Result<Story, StoryLoadError> {
    let content = fs::read_to_string(path)
        .map_err(|e| StoryLoadError::IoError(path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| StoryLoadError::ParseError(path.display().to_string(), e.to_string()))
}

/// In-memory catalog of every story in a directory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct StoryCatalog {
    dir: PathBuf,
    stories: BTreeMap<String, Story>,
}

impl StoryCatalog {
    /// Load all `*.json` stories from `dir`.
    ///
    /// A missing directory gives an empty catalog. Files that fail to parse
    /// are logged and skipped.
    pub fn load(dir: &Path) -> Self {
        let mut catalog = Self {
            dir: dir.to_path_buf(),
            stories: BTreeMap::new(),
        };
        catalog.reload();
        catalog
    }

    /// Re-read the directory, replacing the current contents.
    ///
    /// Returns the number of stories loaded.
    pub fn reload(&mut self) -> usize {
        self.stories.clear();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => {
                tracing::warn!("Stories directory not found: {}", self.dir.display());
                return 0;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match load_story(&path) {
                Ok(story) => {
                    if self.stories.contains_key(&story.id) {
                        tracing::warn!("Duplicate story id {} in {}", story.id, path.display());
                    }
                    self.stories.insert(story.id.clone(), story);
                }
                Err(e) => tracing::warn!("Skipping story: {}", e),
            }
        }

        tracing::info!("Loaded {} stories from {}", self.stories.len(), self.dir.display());
        self.stories.len()
    }

    /// Story summaries, optionally for one level (case-insensitive)
    pub fn list(&self, level: Option<&str>) -> Vec<StoryListItem> {
        self.stories
            .values()
            .filter(|s| level.is_none_or(|l| s.metadata.jlpt_level.eq_ignore_ascii_case(l)))
            .map(Story::summary)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Story> {
        self.stories.get(id)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn story_json(id: &str, level: &str) -> String {
        format!(
            r#"{{
  "id": "{id}",
  "metadata": {{
    "title": "Story {id}",
    "titleJapanese": "はなし",
    "author": "Tester",
    "jlptLevel": "{level}",
    "wordCount": 12,
    "characterCount": 40,
    "genre": "slice of life",
    "tags": ["cat"],
    "summary": "A cat goes outside.",
    "coverImageURL": "covers/{id}.png",
    "createdDate": "2024-01-01"
  }},
  "chapters": [
    {{
      "chapterNumber": 1,
      "chapterTitle": "ねこ",
      "content": [
        {{
          "id": "s1",
          "segmentType": "paragraph",
          "tokens": [
            {{"surface": "猫", "parts": [{{"text": "猫", "reading": "ねこ"}}], "baseForm": "猫"}},
            {{"surface": "が"}},
            {{"surface": "歩いた", "baseForm": "歩く", "partOfSpeech": "verb"}}
          ]
        }}
      ]
    }},
    {{
      "id": "c2",
      "title": "Outside",
      "segments": [
        {{"id": "s2", "segmentType": "dialogue", "tokens": [{{"surface": "外"}}]}}
      ]
    }}
  ]
}}"#
        )
    }

    fn catalog_with(files: &[(&str, String)]) -> (TempDir, StoryCatalog) {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let catalog = StoryCatalog::load(dir.path());
        (dir, catalog)
    }

    #[test]
    fn test_load_and_get() {
        let (_dir, catalog) = catalog_with(&[("cat.json", story_json("cat", "N5"))]);
        assert_eq!(catalog.len(), 1);

        let story = catalog.get("cat").unwrap();
        assert_eq!(story.metadata.cover_image_url.as_deref(), Some("covers/cat.png"));
        assert_eq!(story.chapter_count(), 2);

        let chapters = story.chapters.as_ref().unwrap();
        assert_eq!(chapters[0].chapter_number, Some(1));
        assert_eq!(chapters[1].id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_tokens_flatten_all_chapters() {
        let (_dir, catalog) = catalog_with(&[("cat.json", story_json("cat", "N5"))]);
        let tokens = catalog.get("cat").unwrap().tokens();
        let forms: Vec<&str> = tokens.iter().map(|t| t.lookup_form()).collect();
        assert_eq!(forms, vec!["猫", "が", "歩く", "外"]);
    }

    #[test]
    fn test_list_filters_level_case_insensitively() {
        let (_dir, catalog) = catalog_with(&[
            ("a.json", story_json("a", "N5")),
            ("b.json", story_json("b", "N4")),
        ]);
        assert_eq!(catalog.list(None).len(), 2);

        let n4 = catalog.list(Some("n4"));
        assert_eq!(n4.len(), 1);
        assert_eq!(n4[0].id, "b");
        assert_eq!(n4[0].chapter_count, 2);
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let (_dir, catalog) = catalog_with(&[
            ("good.json", story_json("good", "N5")),
            ("broken.json", "{ not json".to_string()),
            ("notes.txt", "ignored".to_string()),
        ]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("good").is_some());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let catalog = StoryCatalog::load(Path::new("/nonexistent/stories"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_reload_picks_up_new_files() {
        let (dir, mut catalog) = catalog_with(&[("a.json", story_json("a", "N5"))]);
        fs::write(dir.path().join("b.json"), story_json("b", "N3")).unwrap();
        assert_eq!(catalog.reload(), 2);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let (_dir, catalog) = catalog_with(&[("a.json", story_json("a", "N5"))]);
        let json = serde_json::to_value(&catalog.list(None)[0]).unwrap();
        assert_eq!(json["jlptLevel"], "N5");
        assert_eq!(json["coverImageURL"], "covers/a.png");
        assert_eq!(json["chapterCount"], 2);
    }
}
