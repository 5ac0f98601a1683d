use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::GameService,
    types::{GameResponse, GameScoresRequest},
};
use crate::{
    auth::Actor,
    shared::{AppError, AppState},
};

fn service(state: &AppState) -> GameService {
    GameService::new(
        Arc::clone(&state.game_repository),
        Arc::clone(&state.section_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for recording a new game
///
/// POST /sections/{section_id}/games
#[instrument(name = "record_game", skip(state, request))]
pub async fn record_game(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(section_id): Path<String>,
    Json(request): Json<GameScoresRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let game = service(&state)
        .record_game(&actor, &section_id, request.scores)
        .await?;
    Ok(Json(game))
}

/// HTTP handler for listing a section's games with scores
///
/// GET /sections/{section_id}/games
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = service(&state).list_games(&section_id).await?;
    Ok(Json(games))
}

/// HTTP handler for correcting a game's scores
///
/// PUT /sections/{section_id}/games/{game_id}
#[instrument(name = "update_game", skip(state, request))]
pub async fn update_game(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((section_id, game_id)): Path<(String, String)>,
    Json(request): Json<GameScoresRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let game = service(&state)
        .update_game(&actor, &section_id, &game_id, request.scores)
        .await?;
    Ok(Json(game))
}

/// HTTP handler for deleting a game
///
/// DELETE /sections/{section_id}/games/{game_id}
#[instrument(name = "delete_game", skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((section_id, game_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    service(&state)
        .delete_game(&actor, &section_id, &game_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
