// Public API - what other modules can use
pub use handlers::{get_stats, get_user_stats};
pub use models::{DateRange, RankCounts, StatsResult, UserStats};
pub use service::StatsService;

// Internal modules
pub mod engine;
mod handlers;
pub mod models;
pub mod service;
