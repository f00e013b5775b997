//! Application state shared by all handlers.

use std::sync::{Arc, RwLock};

use crate::content::{Dictionary, JapaneseTokenizer, StoryCatalog};
use crate::db::DbPool;
use crate::validation::VocabularyValidator;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Question pool, exposures and learner abilities
    pub db: DbPool,

    /// Stories loaded from disk; replaced wholesale on reload
    pub stories: Arc<RwLock<StoryCatalog>>,

    /// JLPT word lists, read once at startup
    pub vocabulary: Arc<VocabularyValidator>,

    /// None when no IPADIC dictionary was found
    pub tokenizer: Option<Arc<JapaneseTokenizer>>,

    pub dictionary: Arc<Dictionary>,
}

impl AppState {
    pub fn new(db: DbPool, stories: StoryCatalog, vocabulary: VocabularyValidator) -> Self {
        Self {
            db,
            stories: Arc::new(RwLock::new(stories)),
            vocabulary: Arc::new(vocabulary),
            tokenizer: None,
            dictionary: Arc::new(Dictionary::default()),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: JapaneseTokenizer) -> Self {
        self.tokenizer = Some(Arc::new(tokenizer));
        self
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }
}
