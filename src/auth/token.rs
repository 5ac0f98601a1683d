use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::types::ActorClaims;
use crate::shared::AppError;

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Issues a signed actor token. Request handling never mints tokens;
/// this exists for the external identity layer, the dev seed and tests.
pub fn encode_actor_token(secret: &str, user_id: &str, is_admin: bool) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = ActorClaims {
        sub: user_id.to_string(),
        admin: is_admin,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::TokenError(e.to_string()))
}

/// Verifies a signed actor token and returns its claims.
pub fn decode_actor_token(secret: &str, token: &str) -> Result<ActorClaims, AppError> {
    decode::<ActorClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid actor token: {}", e)))
}
