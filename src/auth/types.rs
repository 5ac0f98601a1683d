use serde::{Deserialize, Serialize};

/// Claims carried by a signed actor token. Tokens are issued by the
/// external identity layer; this server only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActorClaims {
    pub sub: String, // user id
    pub admin: bool,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// The authenticated actor attached to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: String,
    pub is_admin: bool,
}

impl From<ActorClaims> for Actor {
    fn from(claims: ActorClaims) -> Self {
        Self {
            id: claims.sub,
            is_admin: claims.admin,
        }
    }
}
