// Library crate for the janlog mahjong score server
// This file exposes the public API for integration tests

pub mod auth;
pub mod game;
pub mod router;
pub mod scoring;
pub mod section;
pub mod shared;
pub mod stats;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::Actor;
pub use router::build_router;
pub use scoring::{ScoreEntry, ScoringError};
pub use section::models::{SectionModel, SectionStatus};
pub use shared::{AppError, AppState};
pub use stats::{StatsResult, UserStats};
