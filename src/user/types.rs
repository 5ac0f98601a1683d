use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::UserModel;

/// Request payload for creating a roster user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request payload for updating a roster user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub is_admin: Option<bool>,
}

/// Response for user endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
