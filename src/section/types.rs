use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::SectionStatus;

/// Request payload for creating a section
#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub name: String,
    pub starting_points: i32,
    pub return_points: i32,
    pub rate: i32,
    pub player_count: i32,
    pub participant_ids: Vec<String>,
}

/// Request payload for updating a section; absent fields stay unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateSectionRequest {
    pub name: Option<String>,
    pub starting_points: Option<i32>,
    pub return_points: Option<i32>,
    pub rate: Option<i32>,
}

/// Query parameters for the section list
#[derive(Debug, Default, Deserialize)]
pub struct ListSectionsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub order: Option<String>,
}

/// One participant as rendered in section responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
}

/// Response for section detail and list endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct SectionResponse {
    pub id: String,
    pub name: String,
    pub starting_points: i32,
    pub return_points: i32,
    pub rate: i32,
    pub player_count: i32,
    pub status: SectionStatus,
    pub created_by: String,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub participants: Vec<ParticipantView>,
    pub game_count: u32,
}

/// One participant's line in the section summary, in roster order
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRow {
    pub user_id: String,
    pub display_name: String,
    pub total_points: i64,
    pub point_diff: i64,
    pub settlement: f64,
    pub rank: u32,
}

/// Response for the section summary endpoint. With `game_count` 0 the
/// rows carry rank 0 and clients show a "no games yet" placeholder;
/// `money_enabled` false means settlement columns are suppressed, not
/// rendered as zero currency.
#[derive(Debug, Serialize, Deserialize)]
pub struct SectionSummaryResponse {
    pub section_id: String,
    pub game_count: u32,
    pub starting_points: i32,
    pub return_points: i32,
    pub rate: i32,
    pub money_enabled: bool,
    pub rows: Vec<SummaryRow>,
}
