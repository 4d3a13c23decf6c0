//! Level selection, answering and scoring.
//!
//! Every function here is pure: it takes the current view of the catalog
//! (already joined with the player's progress) and returns updated copies.
//! Nothing is mutated in place, and a failed call changes nothing.

use std::fmt;

use thiserror::Error;

use crate::model::{Level, LevelId, PlayerStats, QuestionId, Reading, ReadingId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Identifier that could not be resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Level(LevelId),
    Reading(LevelId, ReadingId),
    Question(ReadingId, QuestionId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Level(level) => write!(f, "level {level}"),
            Missing::Reading(level, reading) => write!(f, "reading {reading} in level {level}"),
            Missing::Question(reading, question) => {
                write!(f, "question {question} in reading {reading}")
            }
        }
    }
}

/// User-correctable failures of the progression engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("level {0} is locked; complete the previous levels to unlock it")]
    LevelLocked(LevelId),

    #[error("{0} not found")]
    NotFound(Missing),

    #[error("please answer all questions before submitting ({} unanswered)", .unanswered.len())]
    IncompleteAnswers { unanswered: Vec<QuestionId> },

    #[error("reading {0} has already been completed")]
    AlreadyCompleted(ReadingId),
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

/// Everything a successful submission changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub reading: Reading,
    pub level: Level,
    pub levels: Vec<Level>,
    pub stats: PlayerStats,
    /// Points awarded after the difficulty multiplier.
    pub earned_points: u32,
    /// Next level in catalog order, if this submission unlocked it.
    pub unlocked_level: Option<LevelId>,
}

//
// ─── OPERATIONS ────────────────────────────────────────────────────────────────
//

/// Open a level for browsing.
///
/// # Errors
///
/// Returns `ProgressionError::LevelLocked` if the level is locked and
/// `ProgressionError::NotFound` if it does not exist.
pub fn select_level(levels: &[Level], level_id: LevelId) -> Result<&Level, ProgressionError> {
    let level = levels
        .iter()
        .find(|l| l.id() == level_id)
        .ok_or(ProgressionError::NotFound(Missing::Level(level_id)))?;
    if !level.is_unlocked() {
        return Err(ProgressionError::LevelLocked(level_id));
    }
    Ok(level)
}

/// Look up a reading inside the chosen level.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the reading is not in the level.
pub fn select_reading(level: &Level, reading_id: ReadingId) -> Result<&Reading, ProgressionError> {
    level
        .reading(reading_id)
        .ok_or(ProgressionError::NotFound(Missing::Reading(
            level.id(),
            reading_id,
        )))
}

/// Set the answer text of one question. Empty text is accepted here.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the question is not in the reading.
pub fn record_answer(
    reading: &Reading,
    question_id: QuestionId,
    text: impl Into<String>,
) -> Result<Reading, ProgressionError> {
    let mut updated = reading.clone();
    updated
        .question_mut(question_id)
        .ok_or(ProgressionError::NotFound(Missing::Question(
            reading.id(),
            question_id,
        )))?
        .set_answer(text);
    Ok(updated)
}

/// Score a reading, complete it and unlock the next level when due.
///
/// `reading` carries the player's answers; `level` must be the level that
/// contains it and `all_levels` the full catalog in order.
///
/// # Errors
///
/// - `ProgressionError::AlreadyCompleted` if the reading was completed before
///   (resubmission awards nothing).
/// - `ProgressionError::IncompleteAnswers` if any trimmed answer is empty.
/// - `ProgressionError::NotFound` if the level or reading is not in the catalog.
/// - `ProgressionError::LevelLocked` if the level is still locked.
pub fn submit_reading(
    reading: &Reading,
    level: &Level,
    all_levels: &[Level],
    stats: &PlayerStats,
) -> Result<Submission, ProgressionError> {
    let level_index = all_levels
        .iter()
        .position(|l| l.id() == level.id())
        .ok_or(ProgressionError::NotFound(Missing::Level(level.id())))?;
    let current = &all_levels[level_index];
    if !current.is_unlocked() {
        return Err(ProgressionError::LevelLocked(current.id()));
    }
    let stored = select_reading(current, reading.id())?;
    if stored.is_completed() || reading.is_completed() {
        return Err(ProgressionError::AlreadyCompleted(reading.id()));
    }

    let unanswered = reading.unanswered();
    if !unanswered.is_empty() {
        return Err(ProgressionError::IncompleteAnswers { unanswered });
    }

    let earned_points = reading.award_points();
    let stats = stats.award(earned_points);

    let mut completed = reading.clone();
    completed.set_completed(true);

    let mut levels = all_levels.to_vec();
    if let Some(slot) = levels[level_index].reading_mut(reading.id()) {
        *slot = completed.clone();
    }

    let mut unlocked_level = None;
    if levels[level_index].all_completed() {
        if let Some(next) = levels.get_mut(level_index + 1) {
            if !next.is_unlocked() {
                next.set_unlocked(true);
                unlocked_level = Some(next.id());
            }
        }
    }

    Ok(Submission {
        reading: completed,
        level: levels[level_index].clone(),
        levels,
        stats,
        earned_points,
        unlocked_level,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Question, XP_PER_LEVEL};

    fn reading(id: u64, difficulty: Difficulty, points: &[u32]) -> Reading {
        let questions = points
            .iter()
            .enumerate()
            .map(|(i, p)| Question::new(QuestionId::new(i as u64 + 1), format!("Q{}", i + 1), *p))
            .collect();
        Reading::new(ReadingId::new(id), format!("R{id}"), "body", questions, difficulty)
    }

    /// Level 1 (two easy readings, 25 points each), level 2 locked.
    fn scenario() -> Vec<Level> {
        vec![
            Level::new(
                LevelId::new(1),
                "Beginner",
                vec![
                    reading(1, Difficulty::Easy, &[10, 15]),
                    reading(2, Difficulty::Easy, &[15, 10]),
                ],
                true,
            ),
            Level::new(
                LevelId::new(2),
                "Intermediate",
                vec![reading(3, Difficulty::Medium, &[10, 15])],
                false,
            ),
        ]
    }

    fn answer_all(reading: &Reading) -> Reading {
        reading.questions().iter().fold(reading.clone(), |r, q| {
            record_answer(&r, q.id(), "an answer").unwrap()
        })
    }

    fn stats() -> PlayerStats {
        PlayerStats::new("Ada").unwrap()
    }

    #[test]
    fn select_level_rejects_locked_level() {
        let levels = scenario();
        let before = levels.clone();
        let err = select_level(&levels, LevelId::new(2)).unwrap_err();
        assert_eq!(err, ProgressionError::LevelLocked(LevelId::new(2)));
        assert_eq!(levels, before);
    }

    #[test]
    fn select_level_and_reading_not_found() {
        let levels = scenario();
        assert_eq!(
            select_level(&levels, LevelId::new(7)).unwrap_err(),
            ProgressionError::NotFound(Missing::Level(LevelId::new(7)))
        );
        let level = select_level(&levels, LevelId::new(1)).unwrap();
        assert!(select_reading(level, ReadingId::new(3)).is_err());
        assert_eq!(select_reading(level, ReadingId::new(2)).unwrap().title(), "R2");
    }

    #[test]
    fn record_answer_allows_empty_text() {
        let levels = scenario();
        let r = record_answer(&levels[0].readings()[0], QuestionId::new(1), "").unwrap();
        assert_eq!(r.question(QuestionId::new(1)).unwrap().answer(), "");
        assert!(record_answer(&r, QuestionId::new(9), "x").is_err());
    }

    #[test]
    fn submit_rejects_blank_answers_without_changes() {
        let levels = scenario();
        let partial =
            record_answer(&levels[0].readings()[0], QuestionId::new(1), "something").unwrap();
        let partial = record_answer(&partial, QuestionId::new(2), "   ").unwrap();
        let err = submit_reading(&partial, &levels[0], &levels, &stats()).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::IncompleteAnswers {
                unanswered: vec![QuestionId::new(2)]
            }
        );
    }

    #[test]
    fn medium_and_hard_multipliers() {
        let medium = Level::new(
            LevelId::new(1),
            "L",
            vec![reading(1, Difficulty::Medium, &[10, 15])],
            true,
        );
        let levels = vec![medium];
        let r = answer_all(&levels[0].readings()[0]);
        let out = submit_reading(&r, &levels[0], &levels, &stats()).unwrap();
        assert_eq!(out.earned_points, 38);

        let hard = Level::new(
            LevelId::new(1),
            "L",
            vec![reading(1, Difficulty::Hard, &[20, 15])],
            true,
        );
        let levels = vec![hard];
        let r = answer_all(&levels[0].readings()[0]);
        let out = submit_reading(&r, &levels[0], &levels, &stats()).unwrap();
        assert_eq!(out.earned_points, 70);
    }

    #[test]
    fn completing_level_one_unlocks_level_two() {
        let levels = scenario();
        let first = answer_all(&levels[0].readings()[0]);
        let out = submit_reading(&first, &levels[0], &levels, &stats()).unwrap();
        assert!(out.reading.is_completed());
        assert_eq!(out.unlocked_level, None);
        assert!(!out.levels[1].is_unlocked());

        let levels = out.levels;
        let second = answer_all(&levels[0].readings()[1]);
        let out = submit_reading(&second, &levels[0], &levels, &out.stats).unwrap();

        assert_eq!(out.stats.xp(), 50);
        assert_eq!(out.stats.total_points(), 50);
        assert_eq!(out.stats.streak(), 2);
        assert_eq!(out.unlocked_level, Some(LevelId::new(2)));
        assert!(out.levels[1].is_unlocked());
        assert!(out.level.all_completed());
    }

    #[test]
    fn completing_last_level_unlocks_nothing() {
        let levels = vec![Level::new(
            LevelId::new(1),
            "Only",
            vec![reading(1, Difficulty::Hard, &[50, 50])],
            true,
        )];
        let r = answer_all(&levels[0].readings()[0]);
        let out = submit_reading(&r, &levels[0], &levels, &stats()).unwrap();
        assert_eq!(out.unlocked_level, None);
        assert_eq!(out.levels.len(), 1);
        assert_eq!(out.stats.level(), out.stats.xp() / XP_PER_LEVEL + 1);
        assert_eq!(out.stats.level(), 3);
    }

    #[test]
    fn resubmission_is_rejected() {
        let levels = scenario();
        let r = answer_all(&levels[0].readings()[0]);
        let out = submit_reading(&r, &levels[0], &levels, &stats()).unwrap();
        let again = submit_reading(&r, &out.level, &out.levels, &out.stats).unwrap_err();
        assert_eq!(again, ProgressionError::AlreadyCompleted(ReadingId::new(1)));
    }

    #[test]
    fn submit_in_locked_level_is_rejected() {
        let levels = scenario();
        let r = answer_all(&levels[1].readings()[0]);
        assert_eq!(
            submit_reading(&r, &levels[1], &levels, &stats()).unwrap_err(),
            ProgressionError::LevelLocked(LevelId::new(2))
        );
    }

    #[test]
    fn level_tracks_xp_after_every_submission() {
        let mut levels = scenario();
        let mut stats = stats();
        for reading_id in [1, 2] {
            let r = answer_all(levels[0].reading(ReadingId::new(reading_id)).unwrap());
            let out = submit_reading(&r, &levels[0], &levels, &stats).unwrap();
            assert_eq!(out.stats.level(), out.stats.xp() / XP_PER_LEVEL + 1);
            assert!(out.stats.xp() >= stats.xp());
            levels = out.levels;
            stats = out.stats;
        }
        let r = answer_all(&levels[1].readings()[0]);
        let out = submit_reading(&r, &levels[1], &levels, &stats).unwrap();
        assert_eq!(out.stats.xp(), 88);
        assert_eq!(out.stats.level(), 1);
    }
}
