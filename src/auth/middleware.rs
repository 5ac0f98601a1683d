use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{instrument, warn};

use super::{token, types::Actor};
use crate::shared::{AppError, AppState};
use crate::user::repository::UserRepository;

/// Actor authentication middleware - validates the Authorization Bearer
/// token and attaches the resolved Actor to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::actor_auth))
/// Handlers can then extract Extension(actor): Extension<Actor>.
#[instrument(skip(state, req, next))]
pub async fn actor_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract token from Authorization Bearer header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

    let bearer = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = token::decode_actor_token(&state.token_secret, bearer)?;

    // A token may outlive the roster entry; soft-deleted users keep their
    // history but lose access. The roster is authoritative for the admin
    // flag, not the token.
    let user = state
        .user_repository
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "Actor token references an unknown or deleted user");
            AppError::Unauthorized("Unknown user".to_string())
        })?;

    let actor = Actor {
        id: user.id,
        is_admin: user.is_admin,
    };
    req.extensions_mut().insert(actor);

    // Continue to next middleware/handler
    Ok(next.run(req).await)
}
