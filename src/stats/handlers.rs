use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::{DateRange, StatsResult, UserStats},
    service::StatsService,
};
use crate::{
    auth::Actor,
    shared::{AppError, AppState},
};

fn service(state: &AppState) -> StatsService {
    StatsService::new(
        Arc::clone(&state.section_repository),
        Arc::clone(&state.game_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for the cross-session ranking
///
/// GET /stats?from=YYYY-MM-DD&to=YYYY-MM-DD
#[instrument(name = "get_stats", skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(range): Query<DateRange>,
) -> Result<Json<StatsResult>, AppError> {
    let stats = service(&state).get_stats(range).await?;
    Ok(Json(stats))
}

/// HTTP handler for a single user's lifetime statistics
///
/// GET /stats/users/{user_id}?from=&to=
#[instrument(name = "get_user_stats", skip(state))]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(user_id): Path<String>,
    Query(range): Query<DateRange>,
) -> Result<Json<UserStats>, AppError> {
    let stats = service(&state)
        .get_user_stats(&user_id, range)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No recorded games for this user in the period".to_string())
        })?;
    Ok(Json(stats))
}
