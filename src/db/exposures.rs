//! Exposure logging (which learner saw which question, and how it went)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result, Row};
use std::collections::HashMap;

use super::{format_timestamp, parse_timestamp};
use crate::domain::Exposure;

pub fn insert_exposure(conn: &Connection, exposure: &Exposure) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO exposures (user_id, question_hash, served_at, is_correct, user_ability_at_time)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            exposure.user_id,
            exposure.question_hash,
            format_timestamp(&exposure.served_at),
            exposure.is_correct as i64,
            exposure.user_ability_at_time,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Convert a database row to Exposure
fn row_to_exposure(row: &Row) -> Result<Exposure> {
    let served_at: String = row.get(3)?;
    let is_correct: i64 = row.get(4)?;

    Ok(Exposure {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question_hash: row.get(2)?,
        served_at: parse_timestamp(&served_at).unwrap_or_else(Utc::now),
        is_correct: is_correct != 0,
        user_ability_at_time: row.get(5)?,
    })
}

/// Exposure history for a question, most recent first
pub fn get_question_exposures(conn: &Connection, hash: &str, limit: i64) -> Result<Vec<Exposure>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, question_hash, served_at, is_correct, user_ability_at_time
    FROM exposures
    WHERE question_hash = ?1
    ORDER BY served_at DESC, id DESC
    LIMIT ?2
    "#,
    )?;

    let exposures = stmt
        .query_map(params![hash, limit], row_to_exposure)?
        .collect::<Result<Vec<_>>>()?;

    Ok(exposures)
}

/// Per-question exposure summary for one learner
#[derive(Debug, Clone)]
pub struct UserExposure {
    pub count: i64,
    pub last_served_at: Option<DateTime<Utc>>,
}

/// How often, and how recently, a learner has seen each question
pub fn get_user_exposures(conn: &Connection, user_id: &str) -> Result<HashMap<String, UserExposure>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT question_hash, COUNT(*), MAX(served_at)
    FROM exposures
    WHERE user_id = ?1
    GROUP BY question_hash
    "#,
    )?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            let last: Option<String> = row.get(2)?;
            Ok((
                row.get::<_, String>(0)?,
                UserExposure {
                    count: row.get(1)?,
                    last_served_at: last.as_deref().and_then(parse_timestamp),
                },
            ))
        })?
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(rows)
}

/// Exposures for a learner since the given time, oldest first
pub fn get_recent_exposures(
    conn: &Connection,
    user_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<Exposure>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, question_hash, served_at, is_correct, user_ability_at_time
    FROM exposures
    WHERE user_id = ?1 AND served_at >= ?2
    ORDER BY served_at ASC, id ASC
    "#,
    )?;

    let exposures = stmt
        .query_map(params![user_id, format_timestamp(&since)], row_to_exposure)?
        .collect::<Result<Vec<_>>>()?;

    Ok(exposures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::insert_question;
    use crate::testing::{sample_question, TestEnv};
    use chrono::Duration;

    #[test]
    fn test_insert_and_history() {
        let env = TestEnv::new().unwrap();
        let q = sample_question("japanese", "N5", "a");
        insert_question(&env.conn, &q).unwrap();

        insert_exposure(&env.conn, &Exposure::new("alice", &q.question_hash, true, 0.0)).unwrap();
        insert_exposure(&env.conn, &Exposure::new("bob", &q.question_hash, false, -0.5)).unwrap();

        let history = get_question_exposures(&env.conn, &q.question_hash, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_id, "bob");
        assert!(!history[0].is_correct);
        assert!((history[0].user_ability_at_time + 0.5).abs() < 1e-12);

        assert_eq!(get_question_exposures(&env.conn, &q.question_hash, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_exposure_requires_question() {
        let env = TestEnv::new().unwrap();
        let result = insert_exposure(&env.conn, &Exposure::new("alice", "missing", true, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_exposure_counts() {
        let env = TestEnv::new().unwrap();
        let a = sample_question("japanese", "N5", "a");
        let b = sample_question("japanese", "N5", "b");
        insert_question(&env.conn, &a).unwrap();
        insert_question(&env.conn, &b).unwrap();

        for _ in 0..3 {
            insert_exposure(&env.conn, &Exposure::new("alice", &a.question_hash, true, 0.0)).unwrap();
        }
        insert_exposure(&env.conn, &Exposure::new("alice", &b.question_hash, true, 0.0)).unwrap();
        insert_exposure(&env.conn, &Exposure::new("bob", &b.question_hash, true, 0.0)).unwrap();

        let counts = get_user_exposures(&env.conn, "alice").unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&a.question_hash].count, 3);
        assert_eq!(counts[&b.question_hash].count, 1);
        assert!(counts[&a.question_hash].last_served_at.is_some());

        assert!(get_user_exposures(&env.conn, "carol").unwrap().is_empty());
    }

    #[test]
    fn test_recent_exposures_window() {
        let env = TestEnv::new().unwrap();
        let q = sample_question("japanese", "N5", "a");
        insert_question(&env.conn, &q).unwrap();

        let mut old = Exposure::new("alice", &q.question_hash, true, 0.0);
        old.served_at = Utc::now() - Duration::days(10);
        insert_exposure(&env.conn, &old).unwrap();
        insert_exposure(&env.conn, &Exposure::new("alice", &q.question_hash, false, 0.2)).unwrap();

        let recent = get_recent_exposures(&env.conn, "alice", Utc::now() - Duration::days(1)).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(!recent[0].is_correct);
    }
}
