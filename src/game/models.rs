use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database model for the games table. `game_number` is 1-based and
/// dense within a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameModel {
    pub id: String,
    pub section_id: String,
    pub game_number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameModel {
    /// Creates a new game with a generated id
    pub fn new(section_id: String, game_number: i32) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            section_id,
            game_number,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Database model for the scores table; one row per participant per game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreModel {
    pub id: String,
    pub game_id: String,
    pub user_id: String,
    pub points: i32,
}

impl ScoreModel {
    pub fn new(game_id: String, user_id: String, points: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            game_id,
            user_id,
            points,
        }
    }
}
