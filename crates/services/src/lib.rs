#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod content_service;
pub mod error;
pub mod leaderboard_service;
pub mod play_service;
pub mod play_view;

pub use readrise_core::Clock;

pub use app_services::AppServices;
pub use auth::TokenVerifier;
pub use content_service::{ContentService, SeedOutcome};
pub use error::{AppServicesError, AuthError, ContentServiceError, PlayError};
pub use leaderboard_service::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardService};
pub use play_service::{DEFAULT_SESSION_IDLE_TTL, PlayService};
pub use play_view::{LevelOverview, PlayView, Profile, StatsView, SubmitOutcome};
