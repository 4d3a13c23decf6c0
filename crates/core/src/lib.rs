#![forbid(unsafe_code)]

pub mod achievements;
pub mod leaderboard;
pub mod model;
pub mod navigation;
pub mod progression;
pub mod seed;
pub mod time;

pub use navigation::{NavigationError, PlayState};
pub use progression::{Missing, ProgressionError, Submission};
pub use time::Clock;
