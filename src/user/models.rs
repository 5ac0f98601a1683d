use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::RecordState;

/// Database model for the users table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String,
    pub display_name: String,
    pub is_admin: bool,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new active user with a generated id
    pub fn new(display_name: String, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            display_name,
            is_admin,
            state: RecordState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == RecordState::Active
    }
}
