use readrise_core::model::{LevelId, PlayerStats, QuestionId, ReadingId, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn level_id_from_i64(v: i64) -> Result<LevelId, StorageError> {
    Ok(LevelId::new(i64_to_u64("level_id", v)?))
}

pub(crate) fn reading_id_from_i64(v: i64) -> Result<ReadingId, StorageError> {
    Ok(ReadingId::new(i64_to_u64("reading_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn level_id_to_i64(id: LevelId) -> Result<i64, StorageError> {
    u64_to_i64("level_id", id.value())
}

pub(crate) fn reading_id_to_i64(id: ReadingId) -> Result<i64, StorageError> {
    u64_to_i64("reading_id", id.value())
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    u64_to_i64("question_id", id.value())
}

pub(crate) fn user_id_from_str(v: String) -> Result<UserId, StorageError> {
    UserId::new(v).map_err(ser)
}

/// Map a `players` row to its user id and stats. The player level is derived
/// from xp, so it is not stored.
pub(crate) fn map_player_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(UserId, PlayerStats), StorageError> {
    let user_id = user_id_from_str(row.try_get("user_id").map_err(ser)?)?;
    let name: String = row.try_get("name").map_err(ser)?;
    let xp = i64_to_u32("xp", row.try_get("xp").map_err(ser)?)?;
    let total_points = i64_to_u32("total_points", row.try_get("total_points").map_err(ser)?)?;
    let streak = i64_to_u32("streak", row.try_get("streak").map_err(ser)?)?;

    let stats = PlayerStats::from_persisted(name, xp, total_points, streak).map_err(ser)?;
    Ok((user_id, stats))
}
