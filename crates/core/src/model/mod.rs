mod catalog;
mod difficulty;
pub mod editor;
mod ids;
mod level;
mod progress;
mod reading;
mod stats;

pub use catalog::{Catalog, CatalogError};
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use editor::{CatalogEdit, CatalogEditor, QuestionPatch, ReadingPatch};
pub use ids::{LevelId, ParseIdError, QuestionId, ReadingId, UserId};
pub use level::Level;
pub use progress::{AnswerKey, Progress, ReadingKey};
pub use reading::{Question, Reading};
pub use stats::{PlayerStats, StatsError, XP_PER_LEVEL, level_for_xp};
