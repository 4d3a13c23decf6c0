use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Level;
use crate::model::ids::{LevelId, QuestionId, ReadingId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("level {0} has an empty title")]
    EmptyLevelTitle(LevelId),

    #[error("level {0} appears more than once")]
    DuplicateLevel(LevelId),

    #[error("level {0} has no readings")]
    EmptyLevel(LevelId),

    #[error("reading {reading_id} appears more than once in level {level_id}")]
    DuplicateReading {
        level_id: LevelId,
        reading_id: ReadingId,
    },

    #[error("reading {reading_id} in level {level_id} has an empty title")]
    EmptyReadingTitle {
        level_id: LevelId,
        reading_id: ReadingId,
    },

    #[error("question {question_id} appears more than once in reading {reading_id}")]
    DuplicateQuestion {
        reading_id: ReadingId,
        question_id: QuestionId,
    },

    #[error("question {question_id} in reading {reading_id} has no text")]
    EmptyQuestionText {
        reading_id: ReadingId,
        question_id: QuestionId,
    },

    #[error("question {question_id} in reading {reading_id} must be worth > 0 points")]
    ZeroPoints {
        reading_id: ReadingId,
        question_id: QuestionId,
    },

    #[error("unknown level {0}")]
    UnknownLevel(LevelId),

    #[error("unknown reading {reading_id} in level {level_id}")]
    UnknownReading {
        level_id: LevelId,
        reading_id: ReadingId,
    },

    #[error("unknown question {question_id} in reading {reading_id}")]
    UnknownQuestion {
        reading_id: ReadingId,
        question_id: QuestionId,
    },
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Validated, ordered collection of levels.
///
/// Serializes as a plain JSON array of levels. The first level is always
/// unlocked; later levels carry their authored `unlocked` default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Level>", into = "Vec<Level>")]
pub struct Catalog {
    levels: Vec<Level>,
}

impl Catalog {
    /// Validate a full set of levels.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for blank titles, duplicate ids, levels without
    /// readings, questions without text, or zero-point questions.
    pub fn new(mut levels: Vec<Level>) -> Result<Self, CatalogError> {
        let mut level_ids = HashSet::new();
        for level in &levels {
            validate_level(level)?;
            if !level_ids.insert(level.id()) {
                return Err(CatalogError::DuplicateLevel(level.id()));
            }
        }

        if let Some(first) = levels.first_mut() {
            first.set_unlocked(true);
        }

        Ok(Self { levels })
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn into_levels(self) -> Vec<Level> {
        self.levels
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id() == id)
    }
}

impl TryFrom<Vec<Level>> for Catalog {
    type Error = CatalogError;

    fn try_from(levels: Vec<Level>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<Catalog> for Vec<Level> {
    fn from(catalog: Catalog) -> Self {
        catalog.levels
    }
}

fn validate_level(level: &Level) -> Result<(), CatalogError> {
    if level.title().trim().is_empty() {
        return Err(CatalogError::EmptyLevelTitle(level.id()));
    }
    if level.readings().is_empty() {
        return Err(CatalogError::EmptyLevel(level.id()));
    }

    let mut reading_ids = HashSet::new();
    for reading in level.readings() {
        if !reading_ids.insert(reading.id()) {
            return Err(CatalogError::DuplicateReading {
                level_id: level.id(),
                reading_id: reading.id(),
            });
        }
        if reading.title().trim().is_empty() {
            return Err(CatalogError::EmptyReadingTitle {
                level_id: level.id(),
                reading_id: reading.id(),
            });
        }

        let mut question_ids = HashSet::new();
        for question in reading.questions() {
            if !question_ids.insert(question.id()) {
                return Err(CatalogError::DuplicateQuestion {
                    reading_id: reading.id(),
                    question_id: question.id(),
                });
            }
            if question.text().trim().is_empty() {
                return Err(CatalogError::EmptyQuestionText {
                    reading_id: reading.id(),
                    question_id: question.id(),
                });
            }
            if question.points() == 0 {
                return Err(CatalogError::ZeroPoints {
                    reading_id: reading.id(),
                    question_id: question.id(),
                });
            }
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
