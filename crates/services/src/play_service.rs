use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use readrise_core::achievements;
use readrise_core::model::{Level, LevelId, PlayerStats, Progress, QuestionId, ReadingId, UserId};
use readrise_core::progression::{record_answer, select_level, select_reading, submit_reading};
use readrise_core::{NavigationError, PlayState};
use storage::repository::{ContentRepository, ProgressRepository, Storage};
use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::Clock;
use crate::error::PlayError;
use crate::play_view::{PlayView, Profile, StatsView, SubmitOutcome};

/// Navigation state and progress of one player.
#[derive(Debug)]
struct PlaySession {
    state: PlayState,
    progress: Progress,
}

/// Loaded at most once, then locked for every operation on that player.
type SessionCell = Arc<OnceCell<Mutex<PlaySession>>>;

/// Sessions untouched for this long are dropped when a new player arrives.
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionSlot {
    cell: SessionCell,
    last_used: Instant,
}

/// Drives the play loop for every player.
///
/// Each player has their own session, and every operation on it runs under
/// that session's lock, so two requests from the same player are applied one
/// after the other. Progress changes are persisted before they are applied to
/// the in-memory session; a storage failure leaves the session as it was.
///
/// Idle sessions are evicted after [`DEFAULT_SESSION_IDLE_TTL`]; an evicted
/// player keeps their saved progress and starts again from the level list.
pub struct PlayService {
    clock: Clock,
    content: Arc<dyn ContentRepository>,
    progress: Arc<dyn ProgressRepository>,
    sessions: Mutex<HashMap<UserId, SessionSlot>>,
    idle_ttl: Duration,
}

impl PlayService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn ContentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            content,
            progress,
            sessions: Mutex::new(HashMap::new()),
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
        }
    }

    #[must_use]
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Number of player sessions held in memory.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.content),
            Arc::clone(&storage.progress),
        )
    }

    /// The catalog as an anonymous visitor sees it.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` if the catalog cannot be read.
    pub async fn anonymous_levels(&self) -> Result<Vec<Level>, PlayError> {
        let catalog = self.content.list_levels().await?;
        Ok(Progress::fresh_view(&catalog))
    }

    /// The catalog joined with this player's progress.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` on repository failures.
    pub async fn levels(&self, user_id: &UserId) -> Result<Vec<Level>, PlayError> {
        let cell = self.cell(user_id).await;
        let session = self.lock(&cell, user_id).await?;
        let catalog = self.content.list_levels().await?;
        Ok(session.progress.apply_to(&catalog))
    }

    /// Current play screen.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` on repository failures.
    pub async fn view(&self, user_id: &UserId) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let session = self.lock(&cell, user_id).await?;
        let levels = self.joined(&session.progress).await?;
        Ok(render(&session, &levels))
    }

    /// Open a level from the level list.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Navigation` unless browsing levels, and
    /// `PlayError::Progression` if the level is locked or unknown. The
    /// session is unchanged on error.
    pub async fn select_level(
        &self,
        user_id: &UserId,
        level_id: LevelId,
    ) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        let levels = self.joined(&session.progress).await?;

        let next = session.state.enter_level(level_id)?;
        select_level(&levels, level_id)?;
        session.state = next;

        tracing::debug!(user = %user_id, level = %level_id, "level selected");
        Ok(render(&session, &levels))
    }

    /// Open a reading of the current level.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Navigation` unless browsing readings, and
    /// `PlayError::Progression` if the reading is unknown.
    pub async fn select_reading(
        &self,
        user_id: &UserId,
        reading_id: ReadingId,
    ) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        let levels = self.joined(&session.progress).await?;

        let next = session.state.enter_reading(reading_id)?;
        if let PlayState::AnsweringQuestions { level_id, .. } = next {
            let level = select_level(&levels, level_id)?;
            select_reading(level, reading_id)?;
        }
        session.state = next;

        tracing::debug!(user = %user_id, reading = %reading_id, "reading selected");
        Ok(render(&session, &levels))
    }

    /// Save an answer draft for a question of the open reading.
    ///
    /// Blank answers are stored as-is; they only block submission.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Navigation` unless answering, `PlayError::Progression`
    /// if the question is unknown and `PlayError::Storage` if the draft cannot
    /// be saved.
    pub async fn record_answer(
        &self,
        user_id: &UserId,
        question_id: QuestionId,
        text: String,
    ) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        let (level_id, reading_id) = answering(session.state, "answer a question")?;

        let catalog = self.content.list_levels().await?;
        let levels = session.progress.apply_to(&catalog);
        let level = select_level(&levels, level_id)?;
        record_answer(select_reading(level, reading_id)?, question_id, text.as_str())?;

        let mut progress = session.progress.clone();
        progress.set_answer(level_id, reading_id, question_id, text);
        self.progress.save_progress(&progress).await?;
        session.progress = progress;

        let levels = session.progress.apply_to(&catalog);
        Ok(render(&session, &levels))
    }

    /// Submit the open reading: score it, mark it completed and possibly
    /// unlock the next level, then return to the reading list.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Navigation` unless answering. Returns
    /// `PlayError::Progression` if an answer is blank or the reading was
    /// already completed, and `PlayError::Storage` if the result cannot be
    /// persisted. The session is unchanged on error.
    pub async fn submit(&self, user_id: &UserId) -> Result<SubmitOutcome, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        let (level_id, reading_id) = answering(session.state, "submit answers")?;
        let next = session.state.finish_reading()?;

        let catalog = self.content.list_levels().await?;
        let levels = session.progress.apply_to(&catalog);
        let level = select_level(&levels, level_id)?;
        let reading = select_reading(level, reading_id)?;
        let submission = submit_reading(reading, level, &levels, session.progress.stats())?;

        let mut progress = session.progress.clone();
        progress.record_submission(&submission, self.clock.now());
        self.progress.save_progress(&progress).await?;
        session.progress = progress;
        session.state = next;

        tracing::info!(
            user = %user_id,
            level = %level_id,
            reading = %reading_id,
            earned = submission.earned_points,
            total_points = submission.stats.total_points(),
            "reading submitted"
        );
        if let Some(unlocked) = submission.unlocked_level {
            tracing::info!(user = %user_id, level = %unlocked, "level unlocked");
        }

        let levels = session.progress.apply_to(&catalog);
        Ok(SubmitOutcome {
            earned_points: submission.earned_points,
            unlocked_level: submission.unlocked_level,
            view: render(&session, &levels),
        })
    }

    /// One step back; from the level list this stays put.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` on repository failures.
    pub async fn back(&self, user_id: &UserId) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        session.state = session.state.back();
        let levels = self.joined(&session.progress).await?;
        Ok(render(&session, &levels))
    }

    /// Jump back to the level list from anywhere.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` on repository failures.
    pub async fn back_to_levels(&self, user_id: &UserId) -> Result<PlayView, PlayError> {
        let cell = self.cell(user_id).await;
        let mut session = self.lock(&cell, user_id).await?;
        session.state = session.state.back_to_levels();
        let levels = self.joined(&session.progress).await?;
        Ok(render(&session, &levels))
    }

    /// Stats and achievement progress.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Storage` on repository failures.
    pub async fn profile(&self, user_id: &UserId) -> Result<Profile, PlayError> {
        let cell = self.cell(user_id).await;
        let session = self.lock(&cell, user_id).await?;
        let progress = &session.progress;
        Ok(Profile {
            user_id: progress.user_id().clone(),
            stats: StatsView::from(progress.stats()),
            completed_readings: progress.completed_count(),
            achievements: achievements::evaluate(progress),
        })
    }

    async fn cell(&self, user_id: &UserId) -> SessionCell {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        if let Some(slot) = sessions.get_mut(user_id) {
            slot.last_used = now;
            return Arc::clone(&slot.cell);
        }

        let before = sessions.len();
        sessions.retain(|_, slot| {
            Arc::strong_count(&slot.cell) > 1
                || now.duration_since(slot.last_used) < self.idle_ttl
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }

        let cell = SessionCell::default();
        sessions.insert(
            user_id.clone(),
            SessionSlot {
                cell: Arc::clone(&cell),
                last_used: now,
            },
        );
        cell
    }

    async fn lock<'a>(
        &self,
        cell: &'a SessionCell,
        user_id: &UserId,
    ) -> Result<MutexGuard<'a, PlaySession>, PlayError> {
        let session = cell.get_or_try_init(|| self.load(user_id)).await?;
        Ok(session.lock().await)
    }

    async fn load(&self, user_id: &UserId) -> Result<Mutex<PlaySession>, PlayError> {
        let progress = match self.progress.get_progress(user_id).await? {
            Some(progress) => progress,
            None => {
                tracing::debug!(user = %user_id, "new player");
                Progress::new(user_id.clone(), PlayerStats::new(user_id.as_str())?)
            }
        };
        Ok(Mutex::new(PlaySession {
            state: PlayState::default(),
            progress,
        }))
    }

    async fn joined(&self, progress: &Progress) -> Result<Vec<Level>, PlayError> {
        let catalog = self.content.list_levels().await?;
        Ok(progress.apply_to(&catalog))
    }
}

fn answering(
    state: PlayState,
    action: &'static str,
) -> Result<(LevelId, ReadingId), NavigationError> {
    match state {
        PlayState::AnsweringQuestions {
            level_id,
            reading_id,
        } => Ok((level_id, reading_id)),
        other => Err(other.reject(action)),
    }
}

fn render(session: &PlaySession, levels: &[Level]) -> PlayView {
    PlayView::render(session.state, session.progress.stats(), levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_service::ContentService;
    use readrise_core::ProgressionError;
    use readrise_core::time::fixed_clock;

    async fn seeded() -> (PlayService, Storage) {
        let storage = Storage::in_memory();
        ContentService::new(Arc::clone(&storage.content))
            .seed_default(false)
            .await
            .unwrap();
        (PlayService::from_storage(fixed_clock(), &storage), storage)
    }

    fn user() -> UserId {
        UserId::new("reader-1").unwrap()
    }

    #[tokio::test]
    async fn new_player_starts_on_level_list() {
        let (svc, _) = seeded().await;
        let view = svc.view(&user()).await.unwrap();
        assert_eq!(view.state, PlayState::BrowsingLevels);
        assert_eq!(view.stats.name, "reader-1");
        assert_eq!(view.stats.level, 1);
        assert_eq!(view.levels.len(), 5);
        assert!(view.levels[0].unlocked);
        assert!(!view.levels[1].unlocked);
        assert!(view.level.is_none());
    }

    #[tokio::test]
    async fn locked_level_keeps_state() {
        let (svc, _) = seeded().await;
        let err = svc.select_level(&user(), LevelId::new(2)).await.unwrap_err();
        assert!(matches!(
            err,
            PlayError::Progression(ProgressionError::LevelLocked(_))
        ));
        let view = svc.view(&user()).await.unwrap();
        assert_eq!(view.state, PlayState::BrowsingLevels);
    }

    #[tokio::test]
    async fn answering_outside_a_reading_is_rejected() {
        let (svc, _) = seeded().await;
        let err = svc
            .record_answer(&user(), QuestionId::new(1), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, PlayError::Navigation(_)));
    }

    #[tokio::test]
    async fn progress_survives_a_new_service() {
        let (svc, storage) = seeded().await;
        let u = user();
        svc.select_level(&u, LevelId::new(1)).await.unwrap();
        svc.select_reading(&u, ReadingId::new(1)).await.unwrap();
        svc.record_answer(&u, QuestionId::new(1), "a".into())
            .await
            .unwrap();
        svc.record_answer(&u, QuestionId::new(2), "b".into())
            .await
            .unwrap();
        svc.submit(&u).await.unwrap();

        let fresh = PlayService::from_storage(fixed_clock(), &storage);
        let profile = fresh.profile(&u).await.unwrap();
        assert_eq!(profile.stats.total_points, 25);
        assert_eq!(profile.completed_readings, 1);
        let view = fresh.view(&u).await.unwrap();
        assert_eq!(view.state, PlayState::BrowsingLevels);
        assert_eq!(view.levels[0].completed_readings, 1);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_but_progress_is_kept() {
        let (_, storage) = seeded().await;
        let svc = PlayService::from_storage(fixed_clock(), &storage).with_idle_ttl(Duration::ZERO);

        let u = user();
        svc.select_level(&u, LevelId::new(1)).await.unwrap();
        svc.select_reading(&u, ReadingId::new(1)).await.unwrap();
        svc.record_answer(&u, QuestionId::new(1), "kept".into())
            .await
            .unwrap();
        assert_eq!(svc.session_count().await, 1);

        let other = UserId::new("reader-2").unwrap();
        svc.view(&other).await.unwrap();
        assert_eq!(svc.session_count().await, 1);

        let view = svc.view(&u).await.unwrap();
        assert_eq!(view.state, PlayState::BrowsingLevels);
        let levels = svc.levels(&u).await.unwrap();
        assert_eq!(levels[0].readings()[0].questions()[0].answer(), "kept");
    }

    #[tokio::test]
    async fn active_sessions_survive_other_players() {
        let (svc, _) = seeded().await;
        let u = user();
        svc.select_level(&u, LevelId::new(1)).await.unwrap();
        svc.view(&UserId::new("reader-2").unwrap()).await.unwrap();

        assert_eq!(svc.session_count().await, 2);
        let view = svc.view(&u).await.unwrap();
        assert_eq!(view.state, PlayState::BrowsingReadings { level_id: LevelId::new(1) });
    }
}
