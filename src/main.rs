use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_pool::config::Settings;
use lingua_pool::content::{Dictionary, JapaneseTokenizer, StoryCatalog};
use lingua_pool::state::AppState;
use lingua_pool::validation::VocabularyValidator;
use lingua_pool::{db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lingua_pool=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();

  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");
  let stories = StoryCatalog::load(&settings.stories_dir);
  let vocabulary = VocabularyValidator::load(&settings.word_lists_dir);
  if !vocabulary.is_loaded() {
    tracing::warn!(
      "No JLPT word lists in {}; vocabulary checks will be skipped",
      settings.word_lists_dir.display()
    );
  }

  let dictionary = Dictionary::load(&settings.dictionaries_dir);

  let mut state = AppState::new(pool, stories, vocabulary).with_dictionary(dictionary);
  match JapaneseTokenizer::load(&settings.ipadic_dir) {
    Ok(tokenizer) => state = state.with_tokenizer(tokenizer),
    Err(e) => tracing::warn!("{}; /api/tokenize is disabled", e),
  }

  let app = handlers::router(state);

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.server_port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
