//! Recording a learner's answer to a pooled question.
//!
//! One response touches three tables: the item's calibration counters, the
//! learner's ability estimate and the exposure log. All three are written in
//! a single transaction so a failed write leaves none of them changed.

use rusqlite::Connection;
use serde::Serialize;

use super::{validate_user_id, ServiceError};
use crate::db;
use crate::domain::{Exposure, ItemResponse, PooledQuestion};
use crate::irt::{self, apply_response, item_difficulty, update_ability};

/// What a recorded response changed
#[derive(Debug, Clone, Serialize)]
pub struct ResponseOutcome {
    pub question: PooledQuestion,
    pub ability_before: f64,
    pub ability_after: f64,
    /// Rasch probability of a correct answer before the response
    pub expected_probability: f64,
    pub exposure_id: i64,
}

/// Apply a response to item calibration and learner ability, and log the exposure
pub fn record_response(
    conn: &mut Connection,
    hash: &str,
    user_id: &str,
    response: &ItemResponse,
) -> Result<ResponseOutcome, ServiceError> {
    let user_id = validate_user_id(user_id)?;
    if response.response_time_ms.is_some_and(|ms| ms < 0) {
        return Err(ServiceError::Invalid(
            "response_time_ms must not be negative".to_string(),
        ));
    }

    let tx = conn.transaction()?;

    let mut question =
        db::get_question(&tx, hash)?.ok_or_else(|| ServiceError::NotFound(hash.to_string()))?;

    // Ability moves against the difficulty the learner actually faced
    let difficulty = item_difficulty(&question);
    let mut learner = db::get_learner_or_default(&tx, user_id)?;
    let ability_before = learner.ability;
    let expected = irt::expected_probability(ability_before, difficulty);

    let counted = ItemResponse {
        selected_option: match response.selected_option.as_deref() {
            Some(selected) => question.histogram_key(selected)?,
            None => None,
        },
        ..response.clone()
    };

    let was_flagged = question.stats.flagged;
    question.stats = apply_response(&question.stats, &counted);
    db::save_item_stats(&tx, hash, &question.stats)?;

    learner.ability = update_ability(ability_before, learner.responses, difficulty, response.correct);
    learner.responses += 1;
    db::save_learner(&tx, &learner)?;

    let exposure = Exposure::new(user_id, hash, response.correct, ability_before);
    let exposure_id = db::insert_exposure(&tx, &exposure)?;

    tx.commit()?;

    if question.stats.flagged && !was_flagged {
        tracing::warn!(
            "Question {} flagged for review after {} responses (p={:.3}, a={:?})",
            hash,
            question.stats.total_responses,
            question.stats.correct_rate().unwrap_or_default(),
            question.stats.discrimination
        );
    }
    tracing::debug!(
        "Response from {} on {}: correct={} ability {:.3} -> {:.3}",
        user_id,
        hash,
        response.correct,
        ability_before,
        learner.ability
    );

    Ok(ResponseOutcome {
        question,
        ability_before,
        ability_after: learner.ability,
        expected_probability: expected,
        exposure_id,
    })
}
