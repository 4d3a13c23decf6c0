use serde::{Deserialize, Serialize};

use crate::model::Reading;
use crate::model::ids::{LevelId, ReadingId};

/// A group of readings that unlocks as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    title: String,
    readings: Vec<Reading>,
    #[serde(default)]
    unlocked: bool,
}

impl Level {
    #[must_use]
    pub fn new(
        id: LevelId,
        title: impl Into<String>,
        readings: Vec<Reading>,
        unlocked: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            readings,
            unlocked,
        }
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    #[must_use]
    pub fn reading(&self, id: ReadingId) -> Option<&Reading> {
        self.readings.iter().find(|r| r.id() == id)
    }

    pub fn reading_mut(&mut self, id: ReadingId) -> Option<&mut Reading> {
        self.readings.iter_mut().find(|r| r.id() == id)
    }

    /// Number of completed readings, for the "2/3" badge on the level grid.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.readings.iter().filter(|r| r.is_completed()).count()
    }

    /// True when every reading is completed. A level without readings never is.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.readings.is_empty() && self.readings.iter().all(Reading::is_completed)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn set_unlocked(&mut self, unlocked: bool) {
        self.unlocked = unlocked;
    }

    pub(crate) fn readings_mut(&mut self) -> &mut Vec<Reading> {
        &mut self.readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Question, QuestionId};

    fn level_with(n: u64) -> Level {
        let readings = (1..=n)
            .map(|id| {
                Reading::new(
                    ReadingId::new(id),
                    format!("R{id}"),
                    "body",
                    vec![Question::new(QuestionId::new(1), "Q", 10)],
                    Difficulty::Easy,
                )
            })
            .collect();
        Level::new(LevelId::new(1), "Beginner", readings, true)
    }

    #[test]
    fn counts_completed_readings() {
        let mut level = level_with(2);
        assert_eq!(level.completed_count(), 0);
        level
            .reading_mut(ReadingId::new(2))
            .unwrap()
            .set_completed(true);
        assert_eq!(level.completed_count(), 1);
        assert!(!level.all_completed());
        level
            .reading_mut(ReadingId::new(1))
            .unwrap()
            .set_completed(true);
        assert!(level.all_completed());
    }

    #[test]
    fn empty_level_is_never_complete() {
        assert!(!level_with(0).all_completed());
    }
}
