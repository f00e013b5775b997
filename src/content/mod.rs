//! Reading content served alongside the question pool.
//!
//! Stories live as JSON files under `data/stories/` and are held in memory
//! by a [`StoryCatalog`]; `POST /api/stories/reload` re-reads the directory.
//! The tokenizer turns raw Japanese text into the same [`Token`] shape the
//! stories use, and the dictionary backs word lookups while reading.

pub mod dictionary;
pub mod stories;
pub mod tokenizer;

pub use dictionary::{Dictionary, DictionaryEntry, DictionaryError};
pub use stories::{
    load_story, Chapter, ContentSegment, Story, StoryCatalog, StoryListItem, StoryLoadError, Token,
    TokenPart,
};
pub use tokenizer::{JapaneseTokenizer, TokenizerError};
