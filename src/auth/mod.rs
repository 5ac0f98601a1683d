// Public API - what other modules can use
pub use middleware::actor_auth;
pub use token::{decode_actor_token, encode_actor_token};
pub use types::{Actor, ActorClaims};

// Internal modules
mod middleware;
mod token;
mod types;
