//! Choosing the next questions for a learner.
//!
//! Candidate filtering happens here (servable, not seen recently) over
//! lightweight pool rows; the weighting and sampling live in
//! `irt::selector`. Only the picked questions are loaded in full.

use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use super::{validate_user_id, ServiceError};
use crate::config::{self, MAX_SELECTION, RECENT_EXPOSURE_DAYS};
use crate::db::{self, PoolEntry, UserExposure};
use crate::domain::PooledQuestion;
use crate::irt::{calculate_all_weights, difficulty_or_prior, weighted_sample, Candidate};

/// Questions picked for a learner at their current ability
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub user_id: String,
    pub ability: f64,
    pub responses: i64,
    pub questions: Vec<PooledQuestion>,
}

/// Select up to `count` questions for a learner
pub fn select_for_learner(
    conn: &Connection,
    user_id: &str,
    language: &str,
    level: Option<&str>,
    count: usize,
) -> Result<Selection, ServiceError> {
    let mut rng = rand::rng();
    select_with_rng(conn, user_id, language, level, count, &mut rng)
}

pub(crate) fn select_with_rng<R: Rng + ?Sized>(
    conn: &Connection,
    user_id: &str,
    language: &str,
    level: Option<&str>,
    count: usize,
    rng: &mut R,
) -> Result<Selection, ServiceError> {
    let user_id = validate_user_id(user_id)?;
    if config::get_language(language).is_none() {
        return Err(ServiceError::Invalid(format!("Unsupported language: {}", language)));
    }
    if let Some(level) = level {
        if config::level_index(language, level).is_none() {
            return Err(ServiceError::Invalid(format!(
                "Level '{}' is not defined for {}",
                level, language
            )));
        }
    }
    let count = count.clamp(1, MAX_SELECTION);

    let learner = db::get_learner_or_default(conn, user_id)?;
    let seen = db::get_user_exposures(conn, user_id)?;

    let pool = db::get_selection_pool(conn, language, level)?;
    let eligible = filter_recent(pool, &seen, count);

    let candidates: Vec<Candidate> = eligible
        .iter()
        .map(|entry| Candidate {
            question_hash: entry.question_hash.clone(),
            difficulty: difficulty_or_prior(entry.empirical_difficulty, &entry.language, &entry.level),
            calibrated: entry.empirical_difficulty.is_some(),
            exposures: seen.get(&entry.question_hash).map(|e| e.count).unwrap_or(0),
        })
        .collect();
    let weights = calculate_all_weights(learner.ability, &candidates);
    let picked = weighted_sample(weights, count, rng);
    let questions = db::get_questions_by_hash(conn, &picked)?;

    tracing::debug!(
        "Selected {} of {} requested questions for {} (ability {:.3})",
        questions.len(),
        count,
        user_id,
        learner.ability
    );

    Ok(Selection {
        user_id: learner.user_id,
        ability: learner.ability,
        responses: learner.responses,
        questions,
    })
}

/// Drop questions seen inside the recent window.
///
/// When fewer than `count` fresh questions remain, the least recently seen
/// ones are added back until `count` is reached.
fn filter_recent(
    pool: Vec<PoolEntry>,
    seen: &HashMap<String, UserExposure>,
    count: usize,
) -> Vec<PoolEntry> {
    let cutoff = Utc::now() - Duration::days(RECENT_EXPOSURE_DAYS);

    let (mut fresh, mut recent): (Vec<_>, Vec<_>) = pool.into_iter().partition(|entry| {
        match seen.get(&entry.question_hash).and_then(|e| e.last_served_at) {
            Some(last) => last < cutoff,
            None => true,
        }
    });

    if fresh.len() < count {
        recent.sort_by_key(|entry| seen.get(&entry.question_hash).and_then(|e| e.last_served_at));
        let missing = count - fresh.len();
        fresh.extend(recent.into_iter().take(missing));
    }

    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_exposure, insert_question, save_item_stats, set_review_status};
    use crate::domain::{Exposure, ReviewStatus};
    use crate::testing::{sample_question, TestEnv};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seed_pool(env: &TestEnv, prompts: &[&str]) -> Vec<String> {
        prompts
            .iter()
            .map(|p| {
                let q = sample_question("japanese", "N5", p);
                insert_question(&env.conn, &q).unwrap();
                q.question_hash
            })
            .collect()
    }

    fn expose_at(env: &TestEnv, user: &str, hash: &str, days_ago: i64) {
        let mut exposure = Exposure::new(user, hash, true, 0.0);
        exposure.served_at = Utc::now() - Duration::days(days_ago);
        insert_exposure(&env.conn, &exposure).unwrap();
    }

    #[test]
    fn test_selects_distinct_questions() {
        let env = TestEnv::new().unwrap();
        seed_pool(&env, &["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(7);

        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 3, &mut rng).unwrap();
        assert_eq!(sel.questions.len(), 3);
        assert_eq!(sel.ability, 0.0);
        let hashes: std::collections::HashSet<_> =
            sel.questions.iter().map(|q| &q.question_hash).collect();
        assert_eq!(hashes.len(), 3);
    }

    #[test]
    fn test_count_is_clamped() {
        let env = TestEnv::new().unwrap();
        seed_pool(&env, &["a", "b"]);
        let mut rng = StdRng::seed_from_u64(1);

        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 0, &mut rng).unwrap();
        assert_eq!(sel.questions.len(), 1);

        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 500, &mut rng).unwrap();
        assert_eq!(sel.questions.len(), 2);
    }

    #[test]
    fn test_excludes_retired_and_unreviewed_flagged() {
        let env = TestEnv::new().unwrap();
        let hashes = seed_pool(&env, &["keep", "retired", "flagged", "flagged-kept"]);
        set_review_status(&env.conn, &hashes[1], ReviewStatus::Retired).unwrap();

        let mut stats = crate::domain::ItemStats::default();
        stats.flagged = true;
        save_item_stats(&env.conn, &hashes[2], &stats).unwrap();
        save_item_stats(&env.conn, &hashes[3], &stats).unwrap();
        set_review_status(&env.conn, &hashes[3], ReviewStatus::Kept).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 10, &mut rng).unwrap();
        let mut got: Vec<_> = sel.questions.iter().map(|q| q.question_hash.clone()).collect();
        got.sort();
        let mut want = vec![hashes[0].clone(), hashes[3].clone()];
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn test_recently_seen_excluded_when_enough_fresh() {
        let env = TestEnv::new().unwrap();
        let hashes = seed_pool(&env, &["a", "b", "c"]);
        expose_at(&env, "alice", &hashes[0], 0);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sel = select_with_rng(&env.conn, "alice", "japanese", None, 2, &mut rng).unwrap();
            assert!(sel.questions.iter().all(|q| q.question_hash != hashes[0]));
        }
    }

    #[test]
    fn test_falls_back_to_least_recently_seen() {
        let env = TestEnv::new().unwrap();
        let hashes = seed_pool(&env, &["a", "b", "c"]);
        expose_at(&env, "alice", &hashes[0], 0);
        expose_at(&env, "alice", &hashes[1], 1);

        let mut rng = StdRng::seed_from_u64(11);
        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 2, &mut rng).unwrap();
        let got: Vec<_> = sel.questions.iter().map(|q| q.question_hash.clone()).collect();
        assert_eq!(got.len(), 2);
        assert!(got.contains(&hashes[2]));
        assert!(got.contains(&hashes[1]));
    }

    #[test]
    fn test_other_learners_exposures_ignored() {
        let env = TestEnv::new().unwrap();
        let hashes = seed_pool(&env, &["a"]);
        expose_at(&env, "bob", &hashes[0], 0);

        let mut rng = StdRng::seed_from_u64(5);
        let sel = select_with_rng(&env.conn, "alice", "japanese", None, 1, &mut rng).unwrap();
        assert_eq!(sel.questions[0].question_hash, hashes[0]);
    }

    #[test]
    fn test_level_filter_and_validation() {
        let env = TestEnv::new().unwrap();
        seed_pool(&env, &["a"]);
        let n4 = sample_question("japanese", "N4", "b");
        insert_question(&env.conn, &n4).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let sel = select_with_rng(&env.conn, "alice", "japanese", Some("n4"), 5, &mut rng).unwrap();
        assert_eq!(sel.questions.len(), 1);
        assert_eq!(sel.questions[0].question_hash, n4.question_hash);

        assert!(matches!(
            select_with_rng(&env.conn, "alice", "japanese", Some("B2"), 5, &mut rng),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            select_with_rng(&env.conn, "alice", "klingon", None, 5, &mut rng),
            Err(ServiceError::Invalid(_))
        ));
    }
}
