use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{GameModel, ScoreModel};
use crate::shared::AppError;

/// Trait for game repository operations
#[async_trait]
pub trait GameRepository {
    /// Atomically creates a game and its score rows as one unit; a
    /// failed score insert must leave no orphaned game row.
    async fn create_game_with_scores(
        &self,
        game: &GameModel,
        scores: &[ScoreModel],
    ) -> Result<(), AppError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError>;

    /// A section's games in game-number order, each with its scores
    async fn games_with_scores(
        &self,
        section_id: &str,
    ) -> Result<Vec<(GameModel, Vec<ScoreModel>)>, AppError>;

    async fn count_games(&self, section_id: &str) -> Result<u32, AppError>;

    /// Next dense game number within a section (max existing + 1)
    async fn next_game_number(&self, section_id: &str) -> Result<i32, AppError>;

    /// Replaces a game's scores in one unit and bumps its updated_at
    async fn replace_scores(&self, game_id: &str, scores: &[ScoreModel])
        -> Result<(), AppError>;

    /// Deletes a game and its scores
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of GameRepository for development and testing
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<String, GameModel>>,
    scores: Mutex<HashMap<String, Vec<ScoreModel>>>,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            scores: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self, game, scores))]
    async fn create_game_with_scores(
        &self,
        game: &GameModel,
        scores: &[ScoreModel],
    ) -> Result<(), AppError> {
        debug!(game_id = %game.id, section_id = %game.section_id, "Creating game in memory");

        let mut games = self.games.lock().unwrap();
        if games.contains_key(&game.id) {
            warn!(game_id = %game.id, "Game already exists in memory");
            return Err(AppError::DatabaseError("Game already exists".to_string()));
        }
        games.insert(game.id.clone(), game.clone());
        self.scores
            .lock()
            .unwrap()
            .insert(game.id.clone(), scores.to_vec());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        let games = self.games.lock().unwrap();
        Ok(games.get(game_id).cloned())
    }

    #[instrument(skip(self))]
    async fn games_with_scores(
        &self,
        section_id: &str,
    ) -> Result<Vec<(GameModel, Vec<ScoreModel>)>, AppError> {
        let games = self.games.lock().unwrap();
        let scores = self.scores.lock().unwrap();

        let mut list: Vec<(GameModel, Vec<ScoreModel>)> = games
            .values()
            .filter(|g| g.section_id == section_id)
            .map(|g| {
                (
                    g.clone(),
                    scores.get(&g.id).cloned().unwrap_or_default(),
                )
            })
            .collect();
        list.sort_by_key(|(g, _)| g.game_number);

        Ok(list)
    }

    #[instrument(skip(self))]
    async fn count_games(&self, section_id: &str) -> Result<u32, AppError> {
        let games = self.games.lock().unwrap();
        Ok(games.values().filter(|g| g.section_id == section_id).count() as u32)
    }

    #[instrument(skip(self))]
    async fn next_game_number(&self, section_id: &str) -> Result<i32, AppError> {
        let games = self.games.lock().unwrap();
        let max = games
            .values()
            .filter(|g| g.section_id == section_id)
            .map(|g| g.game_number)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    #[instrument(skip(self, scores))]
    async fn replace_scores(
        &self,
        game_id: &str,
        scores: &[ScoreModel],
    ) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Replacing scores in memory");

        let mut games = self.games.lock().unwrap();
        let game = match games.get_mut(game_id) {
            Some(game) => game,
            None => {
                warn!(game_id = %game_id, "Game not found for score replacement");
                return Err(AppError::NotFound("Game not found".to_string()));
            }
        };

        self.scores
            .lock()
            .unwrap()
            .insert(game_id.to_string(), scores.to_vec());
        game.updated_at = Utc::now();

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Deleting game from memory");

        let mut games = self.games.lock().unwrap();
        if games.remove(game_id).is_none() {
            warn!(game_id = %game_id, "Game not found for deletion");
            return Err(AppError::NotFound("Game not found".to_string()));
        }
        self.scores.lock().unwrap().remove(game_id);

        Ok(())
    }
}

/// PostgreSQL implementation of game repository
pub struct PostgresGameRepository {
    pool: PgPool,
}

impl PostgresGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_game(row: &sqlx::postgres::PgRow) -> GameModel {
    GameModel {
        id: row.get("id"),
        section_id: row.get("section_id"),
        game_number: row.get("game_number"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_score(row: &sqlx::postgres::PgRow) -> ScoreModel {
    ScoreModel {
        id: row.get("id"),
        game_id: row.get("game_id"),
        user_id: row.get("user_id"),
        points: row.get("points"),
    }
}

#[async_trait]
impl GameRepository for PostgresGameRepository {
    #[instrument(skip(self, game, scores))]
    async fn create_game_with_scores(
        &self,
        game: &GameModel,
        scores: &[ScoreModel],
    ) -> Result<(), AppError> {
        debug!(game_id = %game.id, section_id = %game.section_id, "Creating game in database");

        // Game and score rows are one unit; dropping the transaction
        // before commit rolls the game row back, never leaving a game
        // with fewer scores than seats.
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO games (id, section_id, game_number, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(&game.id)
        .bind(&game.section_id)
        .bind(game.game_number)
        .bind(game.created_at)
        .bind(game.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert game");
            AppError::DatabaseError(e.to_string())
        })?;

        for score in scores {
            sqlx::query(
                "INSERT INTO scores (id, game_id, user_id, points) VALUES ($1, $2, $3, $4)",
            )
            .bind(&score.id)
            .bind(&score.game_id)
            .bind(&score.user_id)
            .bind(score.points)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert score");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit game creation");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, section_id, game_number, created_at, updated_at FROM games WHERE id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, game_id = %game_id, "Failed to fetch game");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(row_to_game))
    }

    #[instrument(skip(self))]
    async fn games_with_scores(
        &self,
        section_id: &str,
    ) -> Result<Vec<(GameModel, Vec<ScoreModel>)>, AppError> {
        let game_rows = sqlx::query(
            "SELECT id, section_id, game_number, created_at, updated_at FROM games WHERE section_id = $1 ORDER BY game_number ASC"
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to fetch games");
            AppError::DatabaseError(e.to_string())
        })?;

        let games: Vec<GameModel> = game_rows.iter().map(row_to_game).collect();
        let game_ids: Vec<String> = games.iter().map(|g| g.id.clone()).collect();

        let score_rows =
            sqlx::query("SELECT id, game_id, user_id, points FROM scores WHERE game_id = ANY($1)")
                .bind(&game_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to fetch scores");
                    AppError::DatabaseError(e.to_string())
                })?;

        let mut by_game: HashMap<String, Vec<ScoreModel>> = HashMap::new();
        for row in &score_rows {
            let score = row_to_score(row);
            by_game.entry(score.game_id.clone()).or_default().push(score);
        }

        Ok(games
            .into_iter()
            .map(|game| {
                let scores = by_game.remove(&game.id).unwrap_or_default();
                (game, scores)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_games(&self, section_id: &str) -> Result<u32, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS game_count FROM games WHERE section_id = $1")
            .bind(section_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, section_id = %section_id, "Failed to count games");
                AppError::DatabaseError(e.to_string())
            })?;

        let count: i64 = row.get("game_count");
        Ok(count as u32)
    }

    #[instrument(skip(self))]
    async fn next_game_number(&self, section_id: &str) -> Result<i32, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(game_number), 0) + 1 AS next_number FROM games WHERE section_id = $1"
        )
        .bind(section_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to compute next game number");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.get("next_number"))
    }

    #[instrument(skip(self, scores))]
    async fn replace_scores(
        &self,
        game_id: &str,
        scores: &[ScoreModel],
    ) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Replacing scores in database");

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        let updated = sqlx::query("UPDATE games SET updated_at = $2 WHERE id = $1")
            .bind(game_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, game_id = %game_id, "Failed to touch game");
                AppError::DatabaseError(e.to_string())
            })?;

        if updated.rows_affected() == 0 {
            warn!(game_id = %game_id, "Game not found for score replacement");
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        sqlx::query("DELETE FROM scores WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete old scores");
                AppError::DatabaseError(e.to_string())
            })?;

        for score in scores {
            sqlx::query(
                "INSERT INTO scores (id, game_id, user_id, points) VALUES ($1, $2, $3, $4)",
            )
            .bind(&score.id)
            .bind(&score.game_id)
            .bind(&score.user_id)
            .bind(score.points)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert replacement score");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit score replacement");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Deleting game from database");

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query("DELETE FROM scores WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete scores");
                AppError::DatabaseError(e.to_string())
            })?;

        let deleted = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete game");
                AppError::DatabaseError(e.to_string())
            })?;

        if deleted.rows_affected() == 0 {
            warn!(game_id = %game_id, "Game not found for deletion");
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit game deletion");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
