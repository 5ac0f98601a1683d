use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{GameModel, ScoreModel},
    repository::GameRepository,
    types::{GameResponse, ScoreView},
};
use crate::{
    auth::Actor,
    scoring::{validator, ScoreEntry},
    section::{lifecycle, models::SectionModel, repository::SectionRepository},
    shared::AppError,
    user::repository::UserRepository,
};

/// Service wiring the lifecycle guard and point validator in front of
/// game persistence. Every mutation re-reads the section immediately
/// before writing.
pub struct GameService {
    games: Arc<dyn GameRepository + Send + Sync>,
    sections: Arc<dyn SectionRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl GameService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        sections: Arc<dyn SectionRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            games,
            sections,
            users,
        }
    }

    /// Records a new game for an open section
    #[instrument(skip(self, scores))]
    pub async fn record_game(
        &self,
        actor: &Actor,
        section_id: &str,
        scores: Vec<ScoreEntry>,
    ) -> Result<GameResponse, AppError> {
        let section = self.require_section(section_id).await?;
        let is_participant = self.sections.is_participant(section_id, &actor.id).await?;
        lifecycle::ensure_can_record_game(actor, &section, is_participant)?;

        let entries = self.validate(&section, &scores).await?;

        let game_number = self.games.next_game_number(section_id).await?;
        let game = GameModel::new(section_id.to_string(), game_number);
        let score_rows: Vec<ScoreModel> = entries
            .iter()
            .map(|entry| ScoreModel::new(game.id.clone(), entry.user_id.clone(), entry.points))
            .collect();

        self.games
            .create_game_with_scores(&game, &score_rows)
            .await?;

        info!(
            game_id = %game.id,
            section_id = %section_id,
            game_number = game_number,
            "Game recorded successfully"
        );

        self.to_response(game, score_rows).await
    }

    /// Replaces the scores of an existing game on an open section
    #[instrument(skip(self, scores))]
    pub async fn update_game(
        &self,
        actor: &Actor,
        section_id: &str,
        game_id: &str,
        scores: Vec<ScoreEntry>,
    ) -> Result<GameResponse, AppError> {
        let section = self.require_section(section_id).await?;
        let is_participant = self.sections.is_participant(section_id, &actor.id).await?;
        lifecycle::ensure_can_record_game(actor, &section, is_participant)?;

        let game = self.require_game(section_id, game_id).await?;
        let entries = self.validate(&section, &scores).await?;

        let score_rows: Vec<ScoreModel> = entries
            .iter()
            .map(|entry| ScoreModel::new(game.id.clone(), entry.user_id.clone(), entry.points))
            .collect();

        self.games.replace_scores(game_id, &score_rows).await?;

        info!(game_id = %game_id, section_id = %section_id, "Game scores updated");

        // Reload for the bumped updated_at
        let game = self
            .games
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
        self.to_response(game, score_rows).await
    }

    /// Deletes a game (and its scores) from an open section
    #[instrument(skip(self))]
    pub async fn delete_game(
        &self,
        actor: &Actor,
        section_id: &str,
        game_id: &str,
    ) -> Result<(), AppError> {
        let section = self.require_section(section_id).await?;
        lifecycle::ensure_can_delete_game(actor, &section)?;

        self.require_game(section_id, game_id).await?;
        self.games.delete_game(game_id).await?;

        info!(game_id = %game_id, section_id = %section_id, "Game deleted");
        Ok(())
    }

    /// A section's games with resolved display names, oldest first
    #[instrument(skip(self))]
    pub async fn list_games(&self, section_id: &str) -> Result<Vec<GameResponse>, AppError> {
        self.require_section(section_id).await?;

        let games = self.games.games_with_scores(section_id).await?;

        let user_ids: Vec<String> = games
            .iter()
            .flat_map(|(_, scores)| scores.iter().map(|s| s.user_id.clone()))
            .collect();
        let names = self.users.display_names(&user_ids).await?;

        Ok(games
            .into_iter()
            .map(|(game, scores)| build_response(game, scores, &names))
            .collect())
    }

    async fn validate(
        &self,
        section: &SectionModel,
        scores: &[ScoreEntry],
    ) -> Result<Vec<ScoreEntry>, AppError> {
        let participants = self.sections.participants(&section.id).await?;
        let participant_ids: Vec<String> =
            participants.into_iter().map(|p| p.user_id).collect();

        let entries = validator::validate_scores(
            scores,
            &participant_ids,
            section.starting_points,
            section.player_count as usize,
        )?;
        Ok(entries)
    }

    async fn require_section(&self, section_id: &str) -> Result<SectionModel, AppError> {
        self.sections
            .get_section(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Section not found".to_string()))
    }

    async fn require_game(&self, section_id: &str, game_id: &str) -> Result<GameModel, AppError> {
        let game = self
            .games
            .get_game(game_id)
            .await?
            .filter(|g| g.section_id == section_id)
            .ok_or_else(|| AppError::NotFound("Game not found in this section".to_string()))?;
        Ok(game)
    }

    async fn to_response(
        &self,
        game: GameModel,
        scores: Vec<ScoreModel>,
    ) -> Result<GameResponse, AppError> {
        let user_ids: Vec<String> = scores.iter().map(|s| s.user_id.clone()).collect();
        let names = self.users.display_names(&user_ids).await?;
        Ok(build_response(game, scores, &names))
    }
}

fn build_response(
    game: GameModel,
    scores: Vec<ScoreModel>,
    names: &HashMap<String, String>,
) -> GameResponse {
    GameResponse {
        id: game.id,
        section_id: game.section_id,
        game_number: game.game_number,
        created_at: game.created_at,
        updated_at: game.updated_at,
        scores: scores
            .into_iter()
            .map(|score| ScoreView {
                display_name: names
                    .get(&score.user_id)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                id: score.id,
                user_id: score.user_id,
                points: score.points,
            })
            .collect(),
    }
}
