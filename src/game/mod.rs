// Public API - what other modules can use
pub use handlers::{delete_game, list_games, record_game, update_game};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
