use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::leaderboard_service::LeaderboardService;
use crate::play_service::PlayService;

/// Assembles the services an entry point needs over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    content: Arc<ContentService>,
    play: Arc<PlayService>,
    leaderboard: Arc<LeaderboardService>,
}

impl AppServices {
    /// Build services on the process-wide `SQLite` pool for `db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite_shared(db_url).await?;
        Ok(Self::from_storage(clock, &storage))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(clock, &Storage::in_memory())
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self {
            content: Arc::new(ContentService::new(Arc::clone(&storage.content))),
            play: Arc::new(PlayService::from_storage(clock, storage)),
            leaderboard: Arc::new(LeaderboardService::new(Arc::clone(&storage.progress))),
        }
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn play(&self) -> Arc<PlayService> {
        Arc::clone(&self.play)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }
}
