use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned schema migrations.
///
/// Version 1 creates the catalog document table and the per-user progress
/// tables (players, completed readings, unlocked levels, answer drafts).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        // The whole catalog is one JSON document in a single row.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS catalog (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    document TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS players (
                    user_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    xp INTEGER NOT NULL CHECK (xp >= 0),
                    total_points INTEGER NOT NULL CHECK (total_points >= 0),
                    streak INTEGER NOT NULL CHECK (streak >= 0),
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS completed_readings (
                    user_id TEXT NOT NULL,
                    level_id INTEGER NOT NULL,
                    reading_id INTEGER NOT NULL,
                    completed_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, level_id, reading_id),
                    FOREIGN KEY (user_id) REFERENCES players(user_id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS unlocked_levels (
                    user_id TEXT NOT NULL,
                    level_id INTEGER NOT NULL,
                    PRIMARY KEY (user_id, level_id),
                    FOREIGN KEY (user_id) REFERENCES players(user_id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS answer_drafts (
                    user_id TEXT NOT NULL,
                    level_id INTEGER NOT NULL,
                    reading_id INTEGER NOT NULL,
                    question_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    PRIMARY KEY (user_id, level_id, reading_id, question_id),
                    FOREIGN KEY (user_id) REFERENCES players(user_id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_players_total_points
                    ON players (total_points DESC, name);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
