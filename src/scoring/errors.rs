use thiserror::Error;

use crate::shared::AppError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Expected scores for {expected} players, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("User {user_id} is not a participant of this section")]
    UnknownParticipant { user_id: String },

    #[error("User {user_id} appears more than once in the submission")]
    DuplicateParticipant { user_id: String },

    #[error("Points must be entered in units of 100, got {points}")]
    Quantization { user_id: String, points: i32 },

    #[error(
        "Score total must be {expected}, got {actual} (off by {diff} points)",
        diff = .expected - .actual
    )]
    Balance { expected: i64, actual: i64 },
}

impl ScoringError {
    /// Signed difference (expected - actual) carried by balance failures.
    pub fn balance_diff(&self) -> Option<i64> {
        match self {
            ScoringError::Balance { expected, actual } => Some(expected - actual),
            _ => None,
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        AppError::Validation(err.to_string())
    }
}
