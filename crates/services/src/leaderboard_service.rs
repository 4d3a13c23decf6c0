use std::sync::Arc;

use readrise_core::leaderboard::{self, LeaderboardEntry};
use storage::repository::{ProgressRepository, StorageError};

/// Default number of leaderboard rows.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Ranks every player that has saved progress.
#[derive(Clone)]
pub struct LeaderboardService {
    progress: Arc<dyn ProgressRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// Top `limit` players by total points.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if player stats cannot be read.
    pub async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let players = self.progress.list_player_stats().await?;
        Ok(leaderboard::rank(players, limit))
    }
}
