use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Experience points needed per player level.
pub const XP_PER_LEVEL: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatsError {
    #[error("player name cannot be empty")]
    EmptyName,

    #[error("xp ({xp}) cannot exceed total points ({total_points})")]
    XpExceedsTotal { xp: u32, total_points: u32 },
}

/// Per-player score state.
///
/// `level` is derived from `xp` and never stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    name: String,
    level: u32,
    xp: u32,
    total_points: u32,
    streak: u32,
}

impl PlayerStats {
    /// Fresh stats for a new player: level 1, no points, no streak.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::EmptyName` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, StatsError> {
        Self::from_persisted(name, 0, 0, 0)
    }

    /// Rehydrate stats from storage, re-deriving the level.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the name is blank or xp exceeds total points.
    pub fn from_persisted(
        name: impl Into<String>,
        xp: u32,
        total_points: u32,
        streak: u32,
    ) -> Result<Self, StatsError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StatsError::EmptyName);
        }
        if xp > total_points {
            return Err(StatsError::XpExceedsTotal { xp, total_points });
        }
        Ok(Self {
            name: name.trim().to_owned(),
            level: level_for_xp(xp),
            xp,
            total_points,
            streak,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// XP earned inside the current level, for the progress bar.
    #[must_use]
    pub fn xp_into_level(&self) -> u32 {
        self.xp % XP_PER_LEVEL
    }

    /// Stats after a completed reading worth `points`.
    ///
    /// Adds to xp and total points, recomputes the level and extends the streak.
    #[must_use]
    pub fn award(&self, points: u32) -> Self {
        let xp = self.xp.saturating_add(points);
        Self {
            name: self.name.clone(),
            level: level_for_xp(xp),
            xp,
            total_points: self.total_points.saturating_add(points),
            streak: self.streak.saturating_add(1),
        }
    }
}

/// `floor(xp / 100) + 1`.
#[must_use]
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}
