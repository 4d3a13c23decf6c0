use serde::Serialize;
use thiserror::Error;

use crate::model::{LevelId, ReadingId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct NavigationError {
    pub state: &'static str,
    pub action: &'static str,
}

/// Where a player is within a play session.
///
/// `BrowsingLevels` is the initial state. There is no terminal state: a
/// submitted reading returns to the reading list and the cycle repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    BrowsingLevels,
    BrowsingReadings {
        level_id: LevelId,
    },
    AnsweringQuestions {
        level_id: LevelId,
        reading_id: ReadingId,
    },
}

impl PlayState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PlayState::BrowsingLevels => "browsing levels",
            PlayState::BrowsingReadings { .. } => "browsing readings",
            PlayState::AnsweringQuestions { .. } => "answering questions",
        }
    }

    #[must_use]
    pub fn level_id(&self) -> Option<LevelId> {
        match self {
            PlayState::BrowsingLevels => None,
            PlayState::BrowsingReadings { level_id }
            | PlayState::AnsweringQuestions { level_id, .. } => Some(*level_id),
        }
    }

    /// Level list -> reading list, after a successful level selection.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` unless browsing levels.
    pub fn enter_level(self, level_id: LevelId) -> Result<Self, NavigationError> {
        match self {
            PlayState::BrowsingLevels => Ok(PlayState::BrowsingReadings { level_id }),
            other => Err(other.reject("select a level")),
        }
    }

    /// Reading list -> questions.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` unless browsing readings.
    pub fn enter_reading(self, reading_id: ReadingId) -> Result<Self, NavigationError> {
        match self {
            PlayState::BrowsingReadings { level_id } => Ok(PlayState::AnsweringQuestions {
                level_id,
                reading_id,
            }),
            other => Err(other.reject("select a reading")),
        }
    }

    /// Questions -> reading list, after a successful submission.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` unless answering questions.
    pub fn finish_reading(self) -> Result<Self, NavigationError> {
        match self {
            PlayState::AnsweringQuestions { level_id, .. } => {
                Ok(PlayState::BrowsingReadings { level_id })
            }
            other => Err(other.reject("submit answers")),
        }
    }

    /// One step back. Going back from the level list stays there.
    #[must_use]
    pub fn back(self) -> Self {
        match self {
            PlayState::AnsweringQuestions { level_id, .. } => {
                PlayState::BrowsingReadings { level_id }
            }
            PlayState::BrowsingReadings { .. } | PlayState::BrowsingLevels => {
                PlayState::BrowsingLevels
            }
        }
    }

    #[must_use]
    pub fn back_to_levels(self) -> Self {
        PlayState::BrowsingLevels
    }

    /// The error for attempting `action` in this state.
    #[must_use]
    pub fn reject(self, action: &'static str) -> NavigationError {
        NavigationError {
            state: self.name(),
            action,
        }
    }
}
