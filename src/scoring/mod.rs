pub mod rank;
pub mod settlement;
pub mod summary;
pub mod validator;

mod errors;

pub use errors::ScoringError;

use serde::{Deserialize, Serialize};

/// One participant's point entry for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub user_id: String,
    pub points: i32,
}

impl ScoreEntry {
    pub fn new(user_id: impl Into<String>, points: i32) -> Self {
        Self {
            user_id: user_id.into(),
            points,
        }
    }
}
