use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, game, section, shared::AppState, stats, user};

/// Assembles the full application router. Every route sits behind the
/// actor-token middleware; the external identity layer issues the tokens.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user::create_user).get(user::list_users))
        .route(
            "/users/:user_id",
            patch(user::update_user).delete(user::delete_user),
        )
        .route(
            "/sections",
            post(section::create_section).get(section::list_sections),
        )
        .route(
            "/sections/:section_id",
            get(section::get_section)
                .patch(section::update_section)
                .delete(section::delete_section),
        )
        .route("/sections/:section_id/close", post(section::close_section))
        .route(
            "/sections/:section_id/reopen",
            post(section::reopen_section),
        )
        .route(
            "/sections/:section_id/summary",
            get(section::section_summary),
        )
        .route(
            "/sections/:section_id/games",
            post(game::record_game).get(game::list_games),
        )
        .route(
            "/sections/:section_id/games/:game_id",
            put(game::update_game).delete(game::delete_game),
        )
        .route("/stats", get(stats::get_stats))
        .route("/stats/users/:user_id", get(stats::get_user_stats))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::actor_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
