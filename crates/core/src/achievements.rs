//! Milestones derived from a player's progress.

use serde::Serialize;

use crate::model::Progress;

/// What an achievement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CompletedReadings,
    Streak,
    TotalPoints,
    PlayerLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub target: u32,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: 1,
        name: "Bookworm",
        description: "Read 10 passages",
        metric: Metric::CompletedReadings,
        target: 10,
    },
    Achievement {
        id: 2,
        name: "Streak Master",
        description: "Maintain a 7-day streak",
        metric: Metric::Streak,
        target: 7,
    },
    Achievement {
        id: 3,
        name: "Point Collector",
        description: "Earn 500 points",
        metric: Metric::TotalPoints,
        target: 500,
    },
    Achievement {
        id: 4,
        name: "Level Climber",
        description: "Reach level 5",
        metric: Metric::PlayerLevel,
        target: 5,
    },
];

/// Progress towards one achievement, capped at its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementProgress {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub progress: u32,
    pub target: u32,
    pub unlocked: bool,
}

impl AchievementProgress {
    /// Completion percentage in 0..=100.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.target == 0 {
            return 100;
        }
        self.progress.saturating_mul(100) / self.target
    }
}

fn metric_value(metric: Metric, progress: &Progress) -> u32 {
    let stats = progress.stats();
    match metric {
        Metric::CompletedReadings => u32::try_from(progress.completed_count()).unwrap_or(u32::MAX),
        Metric::Streak => stats.streak(),
        Metric::TotalPoints => stats.total_points(),
        Metric::PlayerLevel => stats.level(),
    }
}

/// Evaluate every achievement in [`ACHIEVEMENTS`] for a player.
#[must_use]
pub fn evaluate(progress: &Progress) -> Vec<AchievementProgress> {
    ACHIEVEMENTS
        .iter()
        .map(|a| {
            let value = metric_value(a.metric, progress);
            AchievementProgress {
                id: a.id,
                name: a.name,
                description: a.description,
                metric: a.metric,
                progress: value.min(a.target),
                target: a.target,
                unlocked: value >= a.target,
            }
        })
        .collect()
}
