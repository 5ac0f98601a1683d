use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rank histogram for one user. Ranks 1..4; 3-player sections only ever
/// populate first through third.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCounts {
    pub first: u32,
    pub second: u32,
    pub third: u32,
    pub fourth: u32,
}

/// Lifetime statistics for one user across the filtered closed sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub display_name: String,
    pub game_count: u32,
    pub section_count: u32,
    pub win_count: u32,
    pub win_rate: f64,
    pub average_rank: f64,
    pub total_settlement: f64,
    pub rank_counts: RankCounts,
}

/// Response for the statistics endpoint. `total_games` and
/// `total_sections` cover all included sections regardless of per-user
/// filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResult {
    pub users: Vec<UserStats>,
    pub total_games: u32,
    pub total_sections: u32,
}

/// Calendar-day range over section close dates; `from` is inclusive,
/// `to` includes the whole named day.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
