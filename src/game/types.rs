use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreEntry;

/// Request payload for recording or correcting a game's scores
#[derive(Debug, Deserialize)]
pub struct GameScoresRequest {
    pub scores: Vec<ScoreEntry>,
}

/// One score row as rendered in game responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreView {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub points: i32,
}

/// Response for game endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: String,
    pub section_id: String,
    pub game_number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scores: Vec<ScoreView>,
}
