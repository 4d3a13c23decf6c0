//! Endpoint handlers. Each one resolves the caller, calls one service
//! operation and returns its JSON.

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
};
use readrise_core::leaderboard::LeaderboardEntry;
use readrise_core::model::{CatalogEdit, Level, LevelId, QuestionId, ReadingId};
use services::{DEFAULT_LEADERBOARD_LIMIT, PlayView, Profile, SubmitOutcome};

use super::identity::{MaybePlayer, Player};
use super::types::{AnswerRequest, HealthResponse, LeaderboardQuery, MAX_LEADERBOARD_LIMIT};
use super::{ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// A numeric id from the path; anything else is a JSON 400.
pub struct IdPath(pub u64);

impl FromRequestParts<AppState> for IdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state).await?;
        Ok(IdPath(id))
    }
}

//
// ─── PUBLIC ──────────────────────────────────────────────────────────────────
//

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Catalog as the caller sees it; anonymous callers get a fresh view.
pub async fn levels_handler(
    State(state): State<AppState>,
    MaybePlayer(user): MaybePlayer,
) -> ApiResult<Vec<Level>> {
    let play = state.services.play();
    let levels = match user {
        Some(user) => play.levels(&user).await?,
        None => play.anonymous_levels().await?,
    };
    Ok(Json(levels))
}

pub async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    Ok(Json(state.services.leaderboard().top(limit).await?))
}

//
// ─── ADMIN ───────────────────────────────────────────────────────────────────
//

pub async fn replace_levels_handler(
    State(state): State<AppState>,
    Player(user): Player,
    Json(levels): Json<Vec<Level>>,
) -> ApiResult<Vec<Level>> {
    tracing::info!(user = %user, levels = levels.len(), "catalog replace requested");
    Ok(Json(state.services.content().replace_levels(levels).await?))
}

pub async fn edit_catalog_handler(
    State(state): State<AppState>,
    Player(user): Player,
    Json(edits): Json<Vec<CatalogEdit>>,
) -> ApiResult<Vec<Level>> {
    tracing::info!(user = %user, edits = edits.len(), "catalog edit requested");
    Ok(Json(state.services.content().edit(edits).await?))
}

//
// ─── PLAYER ──────────────────────────────────────────────────────────────────
//

pub async fn me_handler(
    State(state): State<AppState>,
    Player(user): Player,
) -> ApiResult<Profile> {
    Ok(Json(state.services.play().profile(&user).await?))
}

pub async fn play_view_handler(
    State(state): State<AppState>,
    Player(user): Player,
) -> ApiResult<PlayView> {
    Ok(Json(state.services.play().view(&user).await?))
}

pub async fn select_level_handler(
    State(state): State<AppState>,
    Player(user): Player,
    IdPath(level_id): IdPath,
) -> ApiResult<PlayView> {
    let view = state
        .services
        .play()
        .select_level(&user, LevelId::new(level_id))
        .await?;
    Ok(Json(view))
}

pub async fn select_reading_handler(
    State(state): State<AppState>,
    Player(user): Player,
    IdPath(reading_id): IdPath,
) -> ApiResult<PlayView> {
    let view = state
        .services
        .play()
        .select_reading(&user, ReadingId::new(reading_id))
        .await?;
    Ok(Json(view))
}

pub async fn answer_handler(
    State(state): State<AppState>,
    Player(user): Player,
    IdPath(question_id): IdPath,
    Json(body): Json<AnswerRequest>,
) -> ApiResult<PlayView> {
    let view = state
        .services
        .play()
        .record_answer(&user, QuestionId::new(question_id), body.text)
        .await?;
    Ok(Json(view))
}

pub async fn submit_handler(
    State(state): State<AppState>,
    Player(user): Player,
) -> ApiResult<SubmitOutcome> {
    Ok(Json(state.services.play().submit(&user).await?))
}

pub async fn back_handler(
    State(state): State<AppState>,
    Player(user): Player,
) -> ApiResult<PlayView> {
    Ok(Json(state.services.play().back(&user).await?))
}

pub async fn back_to_levels_handler(
    State(state): State<AppState>,
    Player(user): Player,
) -> ApiResult<PlayView> {
    Ok(Json(state.services.play().back_to_levels(&user).await?))
}
