use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use readrise_core::model::{AnswerKey, PlayerStats, Progress, ReadingKey, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    level_id_from_i64, level_id_to_i64, map_player_row, question_id_from_i64,
    question_id_to_i64, reading_id_from_i64, reading_id_to_i64, ser,
};
use crate::repository::{ProgressRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, name, xp, total_points, streak
            FROM players
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (user_id, stats) = map_player_row(&row)?;

        let completed_rows = sqlx::query(
            r"
            SELECT level_id, reading_id, completed_at
            FROM completed_readings
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut completed = BTreeMap::new();
        for row in completed_rows {
            let key = ReadingKey::new(
                level_id_from_i64(row.try_get("level_id").map_err(ser)?)?,
                reading_id_from_i64(row.try_get("reading_id").map_err(ser)?)?,
            );
            let at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
            completed.insert(key, at);
        }

        let unlocked_rows =
            sqlx::query("SELECT level_id FROM unlocked_levels WHERE user_id = ?1")
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(conn)?;

        let mut unlocked = BTreeSet::new();
        for row in unlocked_rows {
            unlocked.insert(level_id_from_i64(row.try_get("level_id").map_err(ser)?)?);
        }

        let draft_rows = sqlx::query(
            r"
            SELECT level_id, reading_id, question_id, text
            FROM answer_drafts
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut answers = BTreeMap::new();
        for row in draft_rows {
            let key = AnswerKey::new(
                level_id_from_i64(row.try_get("level_id").map_err(ser)?)?,
                reading_id_from_i64(row.try_get("reading_id").map_err(ser)?)?,
                question_id_from_i64(row.try_get("question_id").map_err(ser)?)?,
            );
            let text: String = row.try_get("text").map_err(ser)?;
            answers.insert(key, text);
        }

        Ok(Some(Progress::from_persisted(
            user_id, stats, completed, unlocked, answers,
        )))
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let user_id = progress.user_id().as_str();
        let stats = progress.stats();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO players (user_id, name, xp, total_points, streak, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                xp = excluded.xp,
                total_points = excluded.total_points,
                streak = excluded.streak,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(stats.name())
        .bind(i64::from(stats.xp()))
        .bind(i64::from(stats.total_points()))
        .bind(i64::from(stats.streak()))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Child rows are rewritten wholesale; the record is small.
        for statement in [
            "DELETE FROM completed_readings WHERE user_id = ?1",
            "DELETE FROM unlocked_levels WHERE user_id = ?1",
            "DELETE FROM answer_drafts WHERE user_id = ?1",
        ] {
            sqlx::query(statement)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        for (key, at) in progress.completed() {
            sqlx::query(
                r"
                INSERT INTO completed_readings (user_id, level_id, reading_id, completed_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(user_id)
            .bind(level_id_to_i64(key.level_id)?)
            .bind(reading_id_to_i64(key.reading_id)?)
            .bind(*at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        for level_id in progress.unlocked() {
            sqlx::query("INSERT INTO unlocked_levels (user_id, level_id) VALUES (?1, ?2)")
                .bind(user_id)
                .bind(level_id_to_i64(*level_id)?)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        for (key, text) in progress.answers() {
            sqlx::query(
                r"
                INSERT INTO answer_drafts (user_id, level_id, reading_id, question_id, text)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(user_id)
            .bind(level_id_to_i64(key.level_id)?)
            .bind(reading_id_to_i64(key.reading_id)?)
            .bind(question_id_to_i64(key.question_id)?)
            .bind(text.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn list_player_stats(&self) -> Result<Vec<(UserId, PlayerStats)>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, name, xp, total_points, streak
            FROM players
            ORDER BY total_points DESC, name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_player_row).collect()
    }
}
