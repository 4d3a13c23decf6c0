use chrono::Utc;
use readrise_core::model::Level;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{ContentRepository, StorageError};

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        let row = sqlx::query("SELECT document FROM catalog WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let document: String = row.try_get("document").map_err(ser)?;
        serde_json::from_str(&document).map_err(ser)
    }

    async fn replace_levels(&self, levels: &[Level]) -> Result<Vec<Level>, StorageError> {
        let document = serde_json::to_string(levels).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO catalog (id, document, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            ",
        )
        .bind(document)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(levels.to_vec())
    }
}
