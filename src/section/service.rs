use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    lifecycle,
    models::{SectionModel, SectionParticipant, SectionStatus},
    repository::{SectionFilter, SectionRepository, StatusTransition},
    types::{
        CreateSectionRequest, ParticipantView, SectionResponse, SectionSummaryResponse,
        SummaryRow, UpdateSectionRequest,
    },
};
use crate::{
    auth::Actor,
    game::repository::GameRepository,
    scoring::summary,
    shared::AppError,
    user::repository::UserRepository,
};

const NAME_MAX_CHARS: usize = 100;
const POINTS_MIN: i32 = 1000;
const POINTS_MAX: i32 = 100000;
const RATE_MAX: i32 = 10000;

/// Service for handling section business logic
pub struct SectionService {
    sections: Arc<dyn SectionRepository + Send + Sync>,
    games: Arc<dyn GameRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl SectionService {
    pub fn new(
        sections: Arc<dyn SectionRepository + Send + Sync>,
        games: Arc<dyn GameRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            sections,
            games,
            users,
        }
    }

    /// Creates a section together with its participant roster
    #[instrument(skip(self, request))]
    pub async fn create_section(
        &self,
        actor: &Actor,
        request: CreateSectionRequest,
    ) -> Result<SectionResponse, AppError> {
        let name = validate_name(&request.name)?;
        let starting_points = validate_points(request.starting_points, "Starting points")?;
        let return_points = validate_points(request.return_points, "Return points")?;
        let rate = validate_rate(request.rate)?;
        let player_count = validate_player_count(request.player_count)?;

        if request.participant_ids.len() != player_count as usize {
            return Err(AppError::Validation(format!(
                "Exactly {} participants must be selected",
                player_count
            )));
        }

        let mut seen = HashSet::new();
        for user_id in &request.participant_ids {
            if !seen.insert(user_id.as_str()) {
                return Err(AppError::Validation(
                    "The same player cannot be selected twice".to_string(),
                ));
            }
            if self.users.get_user(user_id).await?.is_none() {
                return Err(AppError::Validation(format!(
                    "Unknown participant: {}",
                    user_id
                )));
            }
        }

        let section = SectionModel::new(
            name,
            starting_points,
            return_points,
            rate,
            player_count,
            actor.id.clone(),
        );
        let participants: Vec<SectionParticipant> = request
            .participant_ids
            .iter()
            .enumerate()
            .map(|(seat, user_id)| {
                SectionParticipant::new(section.id.clone(), user_id.clone(), seat as i32)
            })
            .collect();

        self.sections
            .create_section(&section, &participants)
            .await?;

        info!(
            section_id = %section.id,
            name = %section.name,
            player_count = section.player_count,
            "Section created successfully"
        );

        self.to_response(section).await
    }

    #[instrument(skip(self))]
    pub async fn get_section(&self, section_id: &str) -> Result<SectionResponse, AppError> {
        let section = self.require_section(section_id).await?;
        self.to_response(section).await
    }

    #[instrument(skip(self))]
    pub async fn list_sections(
        &self,
        filter: &SectionFilter,
    ) -> Result<Vec<SectionResponse>, AppError> {
        let sections = self.sections.list_sections(filter).await?;
        debug!(section_count = sections.len(), "Sections retrieved");

        let mut responses = Vec::with_capacity(sections.len());
        for section in sections {
            responses.push(self.to_response(section).await?);
        }
        Ok(responses)
    }

    #[instrument(skip(self, request))]
    pub async fn update_section(
        &self,
        actor: &Actor,
        section_id: &str,
        request: UpdateSectionRequest,
    ) -> Result<SectionResponse, AppError> {
        let mut section = self.require_section(section_id).await?;
        lifecycle::ensure_can_edit_section(actor, &section)?;

        if let Some(name) = request.name {
            section.name = validate_name(&name)?;
        }
        if let Some(starting_points) = request.starting_points {
            section.starting_points = validate_points(starting_points, "Starting points")?;
        }
        if let Some(return_points) = request.return_points {
            section.return_points = validate_points(return_points, "Return points")?;
        }
        if let Some(rate) = request.rate {
            section.rate = validate_rate(rate)?;
        }
        section.updated_at = Utc::now();

        self.sections.update_section(&section).await?;

        info!(section_id = %section.id, "Section updated successfully");
        self.to_response(section).await
    }

    #[instrument(skip(self))]
    pub async fn close_section(
        &self,
        actor: &Actor,
        section_id: &str,
    ) -> Result<SectionResponse, AppError> {
        let section = self.require_section(section_id).await?;
        lifecycle::ensure_can_close(actor, &section)?;

        // Status is re-read by the compare-and-set; a lost race surfaces
        // as InvalidState rather than silently double-closing.
        let transition = self
            .sections
            .transition_status(
                section_id,
                SectionStatus::Active,
                SectionStatus::Closed,
                Some(Utc::now()),
            )
            .await?;

        match transition {
            StatusTransition::Applied(updated) => {
                info!(section_id = %section_id, "Section closed");
                self.to_response(updated).await
            }
            StatusTransition::Conflict => Err(AppError::InvalidState(
                "The section is already closed".to_string(),
            )),
            StatusTransition::NotFound => {
                Err(AppError::NotFound("Section not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn reopen_section(
        &self,
        actor: &Actor,
        section_id: &str,
    ) -> Result<SectionResponse, AppError> {
        let section = self.require_section(section_id).await?;
        lifecycle::ensure_can_reopen(actor, &section)?;

        let transition = self
            .sections
            .transition_status(
                section_id,
                SectionStatus::Closed,
                SectionStatus::Active,
                None,
            )
            .await?;

        match transition {
            StatusTransition::Applied(updated) => {
                info!(section_id = %section_id, "Section reopened");
                self.to_response(updated).await
            }
            StatusTransition::Conflict => Err(AppError::InvalidState(
                "The section is still open".to_string(),
            )),
            StatusTransition::NotFound => {
                Err(AppError::NotFound("Section not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_section(&self, actor: &Actor, section_id: &str) -> Result<(), AppError> {
        let section = self.require_section(section_id).await?;
        lifecycle::ensure_can_edit_section(actor, &section)?;

        self.sections.soft_delete_section(section_id).await?;

        info!(section_id = %section_id, "Section soft-deleted");
        Ok(())
    }

    /// Per-participant totals, ranks and settlements for one section
    #[instrument(skip(self))]
    pub async fn summary(&self, section_id: &str) -> Result<SectionSummaryResponse, AppError> {
        let section = self.require_section(section_id).await?;
        let participants = self.sections.participants(section_id).await?;
        let games = self.games.games_with_scores(section_id).await?;

        let participant_ids: Vec<String> =
            participants.iter().map(|p| p.user_id.clone()).collect();
        let game_maps: Vec<HashMap<String, i32>> = games
            .iter()
            .map(|(_, scores)| {
                scores
                    .iter()
                    .map(|s| (s.user_id.clone(), s.points))
                    .collect()
            })
            .collect();

        let lines = summary::compute_summary(
            &participant_ids,
            &game_maps,
            section.return_points,
            section.rate,
        );

        let names = self.users.display_names(&participant_ids).await?;
        let rows = lines
            .into_iter()
            .map(|line| SummaryRow {
                display_name: resolve_name(&names, &line.user_id),
                user_id: line.user_id,
                total_points: line.total_points,
                point_diff: line.point_diff,
                settlement: line.settlement,
                rank: line.rank,
            })
            .collect();

        Ok(SectionSummaryResponse {
            section_id: section.id,
            game_count: game_maps.len() as u32,
            starting_points: section.starting_points,
            return_points: section.return_points,
            rate: section.rate,
            money_enabled: section.rate > 0,
            rows,
        })
    }

    async fn require_section(&self, section_id: &str) -> Result<SectionModel, AppError> {
        self.sections
            .get_section(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Section not found".to_string()))
    }

    async fn to_response(&self, section: SectionModel) -> Result<SectionResponse, AppError> {
        let participants = self.sections.participants(&section.id).await?;
        let user_ids: Vec<String> = participants.iter().map(|p| p.user_id.clone()).collect();

        let mut name_ids = user_ids.clone();
        name_ids.push(section.created_by.clone());
        let names = self.users.display_names(&name_ids).await?;

        let game_count = self.games.count_games(&section.id).await?;

        Ok(SectionResponse {
            created_by_name: names.get(&section.created_by).cloned(),
            participants: participants
                .into_iter()
                .map(|p| ParticipantView {
                    display_name: resolve_name(&names, &p.user_id),
                    id: p.id,
                    user_id: p.user_id,
                })
                .collect(),
            game_count,
            id: section.id,
            name: section.name,
            starting_points: section.starting_points,
            return_points: section.return_points,
            rate: section.rate,
            player_count: section.player_count,
            status: section.status,
            created_by: section.created_by,
            created_at: section.created_at,
            closed_at: section.closed_at,
        })
    }
}

fn resolve_name(names: &HashMap<String, String>, user_id: &str) -> String {
    names
        .get(user_id)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Section name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Section name must be at most {} characters",
            NAME_MAX_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_points(value: i32, label: &str) -> Result<i32, AppError> {
    if !(POINTS_MIN..=POINTS_MAX).contains(&value) {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {}",
            label, POINTS_MIN, POINTS_MAX
        )));
    }
    Ok(value)
}

fn validate_rate(rate: i32) -> Result<i32, AppError> {
    if !(0..=RATE_MAX).contains(&rate) {
        return Err(AppError::Validation(format!(
            "Rate must be between 0 and {}",
            RATE_MAX
        )));
    }
    Ok(rate)
}

fn validate_player_count(count: i32) -> Result<i32, AppError> {
    if count != 3 && count != 4 {
        return Err(AppError::Validation(
            "Player count must be 3 or 4".to_string(),
        ));
    }
    Ok(count)
}
