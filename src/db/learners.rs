//! Learner ability persistence

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{format_timestamp, parse_timestamp};
use crate::domain::LearnerAbility;

/// Get a stored learner, if they have answered anything yet
pub fn get_learner(conn: &Connection, user_id: &str) -> Result<Option<LearnerAbility>> {
    conn.query_row(
        "SELECT user_id, ability, responses, updated_at FROM learners WHERE user_id = ?1",
        params![user_id],
        |row| {
            let updated_at: Option<String> = row.get(3)?;
            Ok(LearnerAbility {
                user_id: row.get(0)?,
                ability: row.get(1)?,
                responses: row.get(2)?,
                updated_at: updated_at.as_deref().and_then(parse_timestamp),
            })
        },
    )
    .optional()
}

/// Get a learner, falling back to the starting estimate for new users
pub fn get_learner_or_default(conn: &Connection, user_id: &str) -> Result<LearnerAbility> {
    Ok(get_learner(conn, user_id)?.unwrap_or_else(|| LearnerAbility::new(user_id)))
}

/// Store a learner's ability and response count, stamping the update time
pub fn save_learner(conn: &Connection, learner: &LearnerAbility) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO learners (user_id, ability, responses, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(user_id) DO UPDATE SET
      ability = excluded.ability,
      responses = excluded.responses,
      updated_at = excluded.updated_at
    "#,
        params![
            learner.user_id,
            learner.ability,
            learner.responses,
            format_timestamp(&Utc::now()),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_new_learner_defaults() {
        let env = TestEnv::new().unwrap();
        assert!(get_learner(&env.conn, "alice").unwrap().is_none());

        let learner = get_learner_or_default(&env.conn, "alice").unwrap();
        assert_eq!(learner.ability, 0.0);
        assert_eq!(learner.responses, 0);
        assert!(learner.updated_at.is_none());
    }

    #[test]
    fn test_save_and_update() {
        let env = TestEnv::new().unwrap();
        let mut learner = LearnerAbility::new("alice");
        learner.ability = 0.7;
        learner.responses = 3;
        save_learner(&env.conn, &learner).unwrap();

        learner.ability = 0.9;
        learner.responses = 4;
        save_learner(&env.conn, &learner).unwrap();

        let stored = get_learner(&env.conn, "alice").unwrap().unwrap();
        assert!((stored.ability - 0.9).abs() < 1e-12);
        assert_eq!(stored.responses, 4);
        assert!(stored.updated_at.is_some());

        let count: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM learners", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
