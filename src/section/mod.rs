// Public API - what other modules can use
pub use handlers::{
    close_section, create_section, delete_section, get_section, list_sections, reopen_section,
    section_summary, update_section,
};

// Internal modules
mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
