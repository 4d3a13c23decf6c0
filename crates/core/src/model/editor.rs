//! Editing helpers for the admin content screen.
//!
//! The editor works on a full copy of the catalog; the result is validated by
//! [`CatalogEditor::finish`] and then replaced as a unit.

use serde::{Deserialize, Serialize};

use crate::model::ids::{LevelId, QuestionId, ReadingId};
use crate::model::{Catalog, CatalogError, Difficulty, Level, Question, Reading};

/// Points assigned to a freshly added question.
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

/// Partial update of a reading; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// Partial update of a question; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub points: Option<u32>,
}

/// One admin edit, as received over the wire.
///
/// A batch of edits is applied in order and validated once at the end, so
/// intermediate states (a level with no readings yet, a question with no text
/// yet) are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CatalogEdit {
    AddLevel,
    RenameLevel {
        level_id: LevelId,
        title: String,
    },
    AddReading {
        level_id: LevelId,
    },
    UpdateReading {
        level_id: LevelId,
        reading_id: ReadingId,
        #[serde(flatten)]
        patch: ReadingPatch,
    },
    AddQuestion {
        level_id: LevelId,
        reading_id: ReadingId,
    },
    UpdateQuestion {
        level_id: LevelId,
        reading_id: ReadingId,
        question_id: QuestionId,
        #[serde(flatten)]
        patch: QuestionPatch,
    },
    RemoveQuestion {
        level_id: LevelId,
        reading_id: ReadingId,
        question_id: QuestionId,
    },
}

/// Mutable working copy of the level list.
#[derive(Debug, Clone, Default)]
pub struct CatalogEditor {
    levels: Vec<Level>,
}

impl CatalogEditor {
    #[must_use]
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Append a locked level titled "New Level N".
    pub fn add_level(&mut self) -> LevelId {
        let next = self.levels.len() as u64 + 1;
        let id = LevelId::new(next_free(next, self.levels.iter().map(|l| l.id().value())));
        self.levels
            .push(Level::new(id, format!("New Level {next}"), Vec::new(), false));
        id
    }

    /// Rename a level.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLevel` if the level does not exist.
    pub fn rename_level(
        &mut self,
        level_id: LevelId,
        title: impl Into<String>,
    ) -> Result<(), CatalogError> {
        self.level_mut(level_id)?.set_title(title);
        Ok(())
    }

    /// Append an easy, empty reading titled "New Reading" to a level.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLevel` if the level does not exist.
    pub fn add_reading(&mut self, level_id: LevelId) -> Result<ReadingId, CatalogError> {
        let level = self.level_mut(level_id)?;
        let readings = level.readings_mut();
        let next = readings.len() as u64 + 1;
        let id = ReadingId::new(next_free(next, readings.iter().map(|r| r.id().value())));
        readings.push(Reading::new(
            id,
            "New Reading",
            "",
            Vec::new(),
            Difficulty::Easy,
        ));
        Ok(id)
    }

    /// Apply a partial update to a reading.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLevel` or `CatalogError::UnknownReading`.
    pub fn update_reading(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
        patch: ReadingPatch,
    ) -> Result<(), CatalogError> {
        let reading = self.reading_mut(level_id, reading_id)?;
        if let Some(title) = patch.title {
            reading.set_title(title);
        }
        if let Some(content) = patch.content {
            reading.set_content(content);
        }
        if let Some(difficulty) = patch.difficulty {
            reading.set_difficulty(difficulty);
        }
        Ok(())
    }

    /// Append a blank question worth [`DEFAULT_QUESTION_POINTS`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLevel` or `CatalogError::UnknownReading`.
    pub fn add_question(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
    ) -> Result<QuestionId, CatalogError> {
        let questions = self.reading_mut(level_id, reading_id)?.questions_mut();
        let next = questions.len() as u64 + 1;
        let id = QuestionId::new(next_free(next, questions.iter().map(|q| q.id().value())));
        questions.push(Question::new(id, "", DEFAULT_QUESTION_POINTS));
        Ok(id)
    }

    /// Apply a partial update to a question.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the level, reading or question is unknown.
    pub fn update_question(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
        question_id: QuestionId,
        patch: QuestionPatch,
    ) -> Result<(), CatalogError> {
        let question = self
            .reading_mut(level_id, reading_id)?
            .question_mut(question_id)
            .ok_or(CatalogError::UnknownQuestion {
                reading_id,
                question_id,
            })?;
        if let Some(text) = patch.text {
            question.set_text(text);
        }
        if let Some(points) = patch.points {
            question.set_points(points);
        }
        Ok(())
    }

    /// Remove a question from a reading.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the level, reading or question is unknown.
    pub fn remove_question(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
        question_id: QuestionId,
    ) -> Result<(), CatalogError> {
        let questions = self.reading_mut(level_id, reading_id)?.questions_mut();
        let before = questions.len();
        questions.retain(|q| q.id() != question_id);
        if questions.len() == before {
            return Err(CatalogError::UnknownQuestion {
                reading_id,
                question_id,
            });
        }
        Ok(())
    }

    /// Apply one [`CatalogEdit`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the edit addresses something that does not exist.
    pub fn apply(&mut self, edit: CatalogEdit) -> Result<(), CatalogError> {
        match edit {
            CatalogEdit::AddLevel => {
                self.add_level();
            }
            CatalogEdit::RenameLevel { level_id, title } => self.rename_level(level_id, title)?,
            CatalogEdit::AddReading { level_id } => {
                self.add_reading(level_id)?;
            }
            CatalogEdit::UpdateReading {
                level_id,
                reading_id,
                patch,
            } => self.update_reading(level_id, reading_id, patch)?,
            CatalogEdit::AddQuestion {
                level_id,
                reading_id,
            } => {
                self.add_question(level_id, reading_id)?;
            }
            CatalogEdit::UpdateQuestion {
                level_id,
                reading_id,
                question_id,
                patch,
            } => self.update_question(level_id, reading_id, question_id, patch)?,
            CatalogEdit::RemoveQuestion {
                level_id,
                reading_id,
                question_id,
            } => self.remove_question(level_id, reading_id, question_id)?,
        }
        Ok(())
    }

    /// Validate the edited levels.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the result is not a valid catalog.
    pub fn finish(self) -> Result<Catalog, CatalogError> {
        Catalog::new(self.levels)
    }

    fn level_mut(&mut self, level_id: LevelId) -> Result<&mut Level, CatalogError> {
        self.levels
            .iter_mut()
            .find(|l| l.id() == level_id)
            .ok_or(CatalogError::UnknownLevel(level_id))
    }

    fn reading_mut(
        &mut self,
        level_id: LevelId,
        reading_id: ReadingId,
    ) -> Result<&mut Reading, CatalogError> {
        self.level_mut(level_id)?
            .reading_mut(reading_id)
            .ok_or(CatalogError::UnknownReading {
                level_id,
                reading_id,
            })
    }
}

// `len + 1` collides once something in the middle has been removed.
fn next_free(candidate: u64, taken: impl Iterator<Item = u64>) -> u64 {
    let max = taken.max().unwrap_or(0);
    if candidate > max { candidate } else { max + 1 }
}
