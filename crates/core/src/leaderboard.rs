use serde::Serialize;

use crate::model::{PlayerStats, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub total_points: u32,
    pub level: u32,
}

/// Rank players by total points, highest first.
///
/// Ties are broken by name, then user id, so the order is stable.
#[must_use]
pub fn rank(
    players: impl IntoIterator<Item = (UserId, PlayerStats)>,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut players: Vec<_> = players.into_iter().collect();
    players.sort_by(|(a_id, a), (b_id, b)| {
        b.total_points()
            .cmp(&a.total_points())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a_id.cmp(b_id))
    });

    players
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (user_id, stats))| LeaderboardEntry {
            rank: index + 1,
            user_id,
            name: stats.name().to_owned(),
            total_points: stats.total_points(),
            level: stats.level(),
        })
        .collect()
}
