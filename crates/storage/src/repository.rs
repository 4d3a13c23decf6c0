use async_trait::async_trait;
use readrise_core::model::{Level, PlayerStats, Progress, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the level catalog.
///
/// The catalog is read and written as one unit; there are no partial writes.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Return every level, in catalog order. An empty store yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read or decoded.
    async fn list_levels(&self) -> Result<Vec<Level>, StorageError>;

    /// Replace the whole catalog and return what was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be written.
    async fn replace_levels(&self, levels: &[Level]) -> Result<Vec<Level>, StorageError>;
}

/// Repository contract for per-user progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch a user's progress, `None` if they have never played.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError>;

    /// Persist the full progress record for its user, replacing the old one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_progress(&self, progress: &Progress) -> Result<(), StorageError>;

    /// Stats of every known player, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn list_player_stats(&self) -> Result<Vec<(UserId, PlayerStats)>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    levels: Arc<Mutex<Vec<Level>>>,
    progress: Arc<Mutex<HashMap<UserId, Progress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        let guard = self
            .levels
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn replace_levels(&self, levels: &[Level]) -> Result<Vec<Level>, StorageError> {
        let mut guard = self
            .levels
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = levels.to_vec();
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress.user_id().clone(), progress.clone());
        Ok(())
    }

    async fn list_player_stats(&self) -> Result<Vec<(UserId, PlayerStats)>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .values()
            .map(|p| (p.user_id().clone(), p.stats().clone()))
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let content: Arc<dyn ContentRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { content, progress }
    }
}
