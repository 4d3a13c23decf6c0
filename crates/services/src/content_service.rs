use std::sync::Arc;

use readrise_core::model::{Catalog, CatalogEdit, CatalogEditor, Level};
use readrise_core::seed::default_catalog;
use storage::repository::ContentRepository;
use tokio::sync::Mutex;

use crate::error::ContentServiceError;

/// Result of [`ContentService::seed_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { levels: usize },
    /// The store already held a catalog and `force` was not set.
    Skipped { existing: usize },
}

/// Reads and replaces the level catalog.
///
/// Writes are serialized by an internal lock. Concurrent admin edits are
/// last-writer-wins; each edit batch reads the catalog under the same lock it
/// writes under, so no batch is applied to a stale copy.
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    writer: Mutex<()>,
}

impl ContentService {
    #[must_use]
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self {
            content,
            writer: Mutex::new(()),
        }
    }

    /// Full catalog in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if the repository read fails.
    pub async fn list_levels(&self) -> Result<Vec<Level>, ContentServiceError> {
        Ok(self.content.list_levels().await?)
    }

    /// Validate and store a whole new catalog.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Catalog` if validation fails (nothing is
    /// written), or `ContentServiceError::Storage` if the write fails.
    pub async fn replace_levels(
        &self,
        levels: Vec<Level>,
    ) -> Result<Vec<Level>, ContentServiceError> {
        let catalog = Catalog::new(levels)?;
        let _guard = self.writer.lock().await;
        self.store(catalog).await
    }

    /// Apply a batch of editor operations to the current catalog and store
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Catalog` if an edit addresses something
    /// unknown or the edited catalog is invalid, or
    /// `ContentServiceError::Storage` on repository failures.
    pub async fn edit(&self, edits: Vec<CatalogEdit>) -> Result<Vec<Level>, ContentServiceError> {
        let _guard = self.writer.lock().await;
        let mut editor = CatalogEditor::new(self.content.list_levels().await?);
        let count = edits.len();
        for edit in edits {
            editor.apply(edit)?;
        }
        let catalog = editor.finish()?;
        tracing::debug!(edits = count, "catalog edits applied");
        self.store(catalog).await
    }

    /// Write the built-in starter catalog.
    ///
    /// Leaves an existing catalog alone unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` if the starter catalog is invalid or the
    /// repository fails.
    pub async fn seed_default(&self, force: bool) -> Result<SeedOutcome, ContentServiceError> {
        let _guard = self.writer.lock().await;
        let existing = self.content.list_levels().await?.len();
        if existing > 0 && !force {
            tracing::info!(existing, "catalog already present; seed skipped");
            return Ok(SeedOutcome::Skipped { existing });
        }
        let stored = self.store(default_catalog()?).await?;
        Ok(SeedOutcome::Seeded {
            levels: stored.len(),
        })
    }

    async fn store(&self, catalog: Catalog) -> Result<Vec<Level>, ContentServiceError> {
        let stored = self.content.replace_levels(catalog.levels()).await?;
        let readings: usize = stored.iter().map(|l| l.readings().len()).sum();
        tracing::info!(levels = stored.len(), readings, "catalog replaced");
        Ok(stored)
    }
}
