use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::model::ids::{LevelId, QuestionId, ReadingId, UserId};
use crate::model::{Level, PlayerStats};
use crate::progression::Submission;

/// Reading addressed by its level; reading ids are only unique per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadingKey {
    pub level_id: LevelId,
    pub reading_id: ReadingId,
}

impl ReadingKey {
    #[must_use]
    pub fn new(level_id: LevelId, reading_id: ReadingId) -> Self {
        Self {
            level_id,
            reading_id,
        }
    }
}

/// Question addressed by its level and reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnswerKey {
    pub level_id: LevelId,
    pub reading_id: ReadingId,
    pub question_id: QuestionId,
}

impl AnswerKey {
    #[must_use]
    pub fn new(level_id: LevelId, reading_id: ReadingId, question_id: QuestionId) -> Self {
        Self {
            level_id,
            reading_id,
            question_id,
        }
    }
}

/// One player's progress, kept apart from the shared catalog.
///
/// The catalog is never mutated on behalf of a player. Instead this record is
/// joined onto a copy of it with [`Progress::apply_to`], which fills in the
/// `completed`, `unlocked` and `answer` fields seen by that player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    user_id: UserId,
    stats: PlayerStats,
    completed: BTreeMap<ReadingKey, DateTime<Utc>>,
    unlocked: BTreeSet<LevelId>,
    answers: BTreeMap<AnswerKey, String>,
}

impl Progress {
    #[must_use]
    pub fn new(user_id: UserId, stats: PlayerStats) -> Self {
        Self {
            user_id,
            stats,
            completed: BTreeMap::new(),
            unlocked: BTreeSet::new(),
            answers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_persisted(
        user_id: UserId,
        stats: PlayerStats,
        completed: BTreeMap<ReadingKey, DateTime<Utc>>,
        unlocked: BTreeSet<LevelId>,
        answers: BTreeMap<AnswerKey, String>,
    ) -> Self {
        Self {
            user_id,
            stats,
            completed,
            unlocked,
            answers,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeMap<ReadingKey, DateTime<Utc>> {
        &self.completed
    }

    #[must_use]
    pub fn unlocked(&self) -> &BTreeSet<LevelId> {
        &self.unlocked
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<AnswerKey, String> {
        &self.answers
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_completed(&self, level_id: LevelId, reading_id: ReadingId) -> bool {
        self.completed
            .contains_key(&ReadingKey::new(level_id, reading_id))
    }

    /// Store a draft answer. Blank text is kept as-is until submission.
    pub fn set_answer(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
        question_id: QuestionId,
        text: impl Into<String>,
    ) {
        self.answers.insert(
            AnswerKey::new(level_id, reading_id, question_id),
            text.into(),
        );
    }

    /// Fold a successful submission into this record.
    ///
    /// Marks the reading completed at `at`, remembers a newly unlocked level,
    /// takes the updated stats and drops the reading's answer drafts.
    pub fn record_submission(&mut self, submission: &Submission, at: DateTime<Utc>) {
        let level_id = submission.level.id();
        let reading_id = submission.reading.id();
        self.completed
            .entry(ReadingKey::new(level_id, reading_id))
            .or_insert(at);
        if let Some(next) = submission.unlocked_level {
            self.unlocked.insert(next);
        }
        self.stats = submission.stats.clone();
        self.answers
            .retain(|key, _| !(key.level_id == level_id && key.reading_id == reading_id));
    }

    /// Join this progress onto a copy of the catalog levels.
    ///
    /// A level is unlocked if it is the first one, if the catalog opens it by
    /// default, if this player unlocked it, or if every reading of the level
    /// before it is completed. Stored catalog `completed` and
    /// `answer` values are ignored.
    #[must_use]
    pub fn apply_to(&self, levels: &[Level]) -> Vec<Level> {
        join(levels, Some(self))
    }

    /// The catalog as a player with no progress at all would see it.
    #[must_use]
    pub fn fresh_view(levels: &[Level]) -> Vec<Level> {
        join(levels, None)
    }
}

fn join(levels: &[Level], progress: Option<&Progress>) -> Vec<Level> {
    let mut joined: Vec<Level> = Vec::with_capacity(levels.len());
    for level in levels {
        let mut level = level.clone();
        let level_id = level.id();
        for reading in level.readings_mut() {
            let reading_id = reading.id();
            let completed = progress.is_some_and(|p| p.is_completed(level_id, reading_id));
            reading.set_completed(completed);
            reading.clear_answers();
            let Some(progress) = progress else {
                continue;
            };
            for question in reading.questions_mut() {
                let key = AnswerKey::new(level_id, reading_id, question.id());
                if let Some(text) = progress.answers.get(&key) {
                    question.set_answer(text.clone());
                }
            }
        }

        // A finished predecessor opens the level even if it was added later.
        let unlocked = joined.last().is_none_or(Level::all_completed)
            || level.is_unlocked()
            || progress.is_some_and(|p| p.unlocked.contains(&level_id));
        level.set_unlocked(unlocked);
        joined.push(level);
    }
    joined
}
