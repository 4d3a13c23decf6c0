use serde::Serialize;

use readrise_core::PlayState;
use readrise_core::achievements::AchievementProgress;
use readrise_core::model::{Level, LevelId, PlayerStats, Reading, UserId, XP_PER_LEVEL};

/// One tile of the level grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelOverview {
    pub id: LevelId,
    pub title: String,
    pub unlocked: bool,
    pub completed_readings: usize,
    pub total_readings: usize,
}

impl LevelOverview {
    /// Summarize a level already joined with a player's progress.
    #[must_use]
    pub fn of(level: &Level) -> Self {
        Self {
            id: level.id(),
            title: level.title().to_owned(),
            unlocked: level.is_unlocked(),
            completed_readings: level.completed_count(),
            total_readings: level.readings().len(),
        }
    }
}

/// Player stats plus the xp bar position within the current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub xp_into_level: u32,
    pub xp_per_level: u32,
    pub total_points: u32,
    pub streak: u32,
}

impl From<&PlayerStats> for StatsView {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            name: stats.name().to_owned(),
            level: stats.level(),
            xp: stats.xp(),
            xp_into_level: stats.xp_into_level(),
            xp_per_level: XP_PER_LEVEL,
            total_points: stats.total_points(),
            streak: stats.streak(),
        }
    }
}

/// Everything a client needs to draw the current play screen.
///
/// `level` is present while browsing readings or answering; `reading` only
/// while answering. Both are joined with the player's progress, so they carry
/// completion flags and saved answer drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayView {
    #[serde(flatten)]
    pub state: PlayState,
    pub stats: StatsView,
    pub levels: Vec<LevelOverview>,
    pub level: Option<Level>,
    pub reading: Option<Reading>,
}

impl PlayView {
    pub(crate) fn render(state: PlayState, stats: &PlayerStats, levels: &[Level]) -> Self {
        let level = state
            .level_id()
            .and_then(|id| levels.iter().find(|l| l.id() == id))
            .cloned();
        let reading = match state {
            PlayState::AnsweringQuestions { reading_id, .. } => level
                .as_ref()
                .and_then(|l| l.reading(reading_id))
                .cloned(),
            PlayState::BrowsingLevels | PlayState::BrowsingReadings { .. } => None,
        };
        Self {
            state,
            stats: StatsView::from(stats),
            levels: levels.iter().map(LevelOverview::of).collect(),
            level,
            reading,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub earned_points: u32,
    pub unlocked_level: Option<LevelId>,
    #[serde(flatten)]
    pub view: PlayView,
}

/// A player's stats and achievement progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub user_id: UserId,
    pub stats: StatsView,
    pub completed_readings: usize,
    pub achievements: Vec<AchievementProgress>,
}
