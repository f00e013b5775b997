use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Exposures reference questions; enforce it on every connection we migrate
  conn.pragma_update(None, "foreign_keys", "ON")?;

  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS questions (
      question_hash TEXT PRIMARY KEY,
      language TEXT NOT NULL,
      level TEXT NOT NULL,
      question_type TEXT NOT NULL,
      prompt TEXT NOT NULL,
      options TEXT NOT NULL DEFAULT '[]',
      correct_answer TEXT NOT NULL,
      explanation TEXT,
      source_story_id TEXT,
      created_at TEXT NOT NULL,
      -- Calibration counters
      total_responses INTEGER NOT NULL DEFAULT 0,
      correct_responses INTEGER NOT NULL DEFAULT 0,
      timed_responses INTEGER NOT NULL DEFAULT 0,
      avg_response_time_ms REAL,
      distractor_counts TEXT NOT NULL DEFAULT '{}',
      -- Derived IRT parameters
      empirical_difficulty REAL,
      discrimination REAL,
      flagged INTEGER NOT NULL DEFAULT 0,
      -- Human review
      review_status TEXT NOT NULL DEFAULT 'pending',
      reviewed_at TEXT
    );

    CREATE TABLE IF NOT EXISTS exposures (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      question_hash TEXT NOT NULL,
      served_at TEXT NOT NULL,
      is_correct INTEGER NOT NULL,
      user_ability_at_time REAL NOT NULL,
      FOREIGN KEY (question_hash) REFERENCES questions(question_hash)
    );

    CREATE TABLE IF NOT EXISTS learners (
      user_id TEXT PRIMARY KEY,
      ability REAL NOT NULL DEFAULT 0.0,
      responses INTEGER NOT NULL DEFAULT 0,
      updated_at TEXT
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_questions_language_level ON questions(language, level);
    CREATE INDEX IF NOT EXISTS idx_questions_flagged ON questions(flagged);
    CREATE INDEX IF NOT EXISTS idx_exposures_user_served ON exposures(user_id, served_at);
    CREATE INDEX IF NOT EXISTS idx_exposures_question ON exposures(question_hash);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: response-time denominator separate from total responses
  let had_timed = column_exists(conn, "questions", "timed_responses");
  add_column_if_missing(conn, "questions", "timed_responses", "INTEGER NOT NULL DEFAULT 0")?;

  // Older rows averaged over every response; keep their mean meaningful
  if !had_timed {
    conn.execute(
      "UPDATE questions SET timed_responses = total_responses WHERE avg_response_time_ms IS NOT NULL",
      [],
    )?;
  }

  // Migration: review workflow columns
  add_column_if_missing(conn, "questions", "review_status", "TEXT NOT NULL DEFAULT 'pending'")?;
  add_column_if_missing(conn, "questions", "reviewed_at", "TEXT")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    assert!(column_exists(&conn, "questions", "timed_responses"));
    assert!(column_exists(&conn, "exposures", "user_ability_at_time"));
    assert!(column_exists(&conn, "learners", "ability"));
  }

  #[test]
  fn test_upgrade_adds_review_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn
      .execute_batch(
        r#"
        CREATE TABLE questions (
          question_hash TEXT PRIMARY KEY,
          language TEXT NOT NULL,
          level TEXT NOT NULL,
          question_type TEXT NOT NULL,
          prompt TEXT NOT NULL,
          options TEXT NOT NULL DEFAULT '[]',
          correct_answer TEXT NOT NULL,
          explanation TEXT,
          source_story_id TEXT,
          created_at TEXT NOT NULL,
          total_responses INTEGER NOT NULL DEFAULT 0,
          correct_responses INTEGER NOT NULL DEFAULT 0,
          avg_response_time_ms REAL,
          distractor_counts TEXT NOT NULL DEFAULT '{}',
          empirical_difficulty REAL,
          discrimination REAL,
          flagged INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO questions (question_hash, language, level, question_type, prompt,
          correct_answer, created_at, total_responses, correct_responses, avg_response_time_ms)
        VALUES ('h1', 'japanese', 'N5', 'fill_blank', 'p', 'a', '2026-01-01T00:00:00+00:00', 4, 2, 1200.0);
        "#,
      )
      .unwrap();

    run_migrations(&conn).unwrap();

    let (timed, status): (i64, String) = conn
      .query_row(
        "SELECT timed_responses, review_status FROM questions WHERE question_hash = 'h1'",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .unwrap();
    assert_eq!(timed, 4);
    assert_eq!(status, "pending");
  }
}
