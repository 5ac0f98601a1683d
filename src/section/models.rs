use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::shared::RecordState;

/// Lifecycle status of a scoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Active,
    Closed,
}

/// Database model for the sections table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionModel {
    pub id: String,
    pub name: String,
    pub starting_points: i32,
    pub return_points: i32,
    pub rate: i32,
    pub player_count: i32,
    pub status: SectionStatus,
    pub created_by: String,
    pub closed_at: Option<DateTime<Utc>>,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SectionModel {
    /// Creates a new active section with a generated id
    pub fn new(
        name: String,
        starting_points: i32,
        return_points: i32,
        rate: i32,
        player_count: i32,
        created_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            starting_points,
            return_points,
            rate,
            player_count,
            status: SectionStatus::Active,
            created_by,
            closed_at: None,
            state: RecordState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SectionStatus::Active
    }

    pub fn is_creator(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }
}

/// Join row linking a section to one of its players. Created atomically
/// with the section and immutable afterwards; `seat` preserves the
/// roster order chosen at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionParticipant {
    pub id: String,
    pub section_id: String,
    pub user_id: String,
    pub seat: i32,
}

impl SectionParticipant {
    pub fn new(section_id: String, user_id: String, seat: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            section_id,
            user_id,
            seat,
        }
    }
}
