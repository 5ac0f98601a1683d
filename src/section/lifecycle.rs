use thiserror::Error;

use super::models::{SectionModel, SectionStatus};
use crate::{auth::Actor, shared::AppError};

/// Typed denial reasons for section and game mutations. Every denial is
/// surfaced to the caller as a user-facing message, never ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    InvalidState(String),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Permission(msg) => AppError::PermissionDenied(msg),
            LifecycleError::InvalidState(msg) => AppError::InvalidState(msg),
        }
    }
}

fn manages_section(actor: &Actor, section: &SectionModel) -> bool {
    actor.is_admin || section.is_creator(&actor.id)
}

/// close: active -> closed, creator or admin only.
pub fn ensure_can_close(actor: &Actor, section: &SectionModel) -> Result<(), LifecycleError> {
    if !manages_section(actor, section) {
        return Err(LifecycleError::Permission(
            "Only the section creator or an administrator can close it".to_string(),
        ));
    }
    if !section.is_open() {
        return Err(LifecycleError::InvalidState(
            "The section is already closed".to_string(),
        ));
    }
    Ok(())
}

/// reopen: closed -> active, creator or admin only.
pub fn ensure_can_reopen(actor: &Actor, section: &SectionModel) -> Result<(), LifecycleError> {
    if !manages_section(actor, section) {
        return Err(LifecycleError::Permission(
            "Only the section creator or an administrator can reopen it".to_string(),
        ));
    }
    if section.status != SectionStatus::Closed {
        return Err(LifecycleError::InvalidState(
            "The section is still open".to_string(),
        ));
    }
    Ok(())
}

/// Section update and soft delete: creator or admin, regardless of status.
pub fn ensure_can_edit_section(
    actor: &Actor,
    section: &SectionModel,
) -> Result<(), LifecycleError> {
    if !manages_section(actor, section) {
        return Err(LifecycleError::Permission(
            "Only the section creator or an administrator can edit it".to_string(),
        ));
    }
    Ok(())
}

/// Game create/update: section must be open, actor must be a participant
/// or an administrator. The status gate comes first so a closed section
/// denies every actor the same way.
pub fn ensure_can_record_game(
    actor: &Actor,
    section: &SectionModel,
    is_participant: bool,
) -> Result<(), LifecycleError> {
    if !section.is_open() {
        return Err(LifecycleError::InvalidState(
            "Scores cannot be changed on a closed section".to_string(),
        ));
    }
    if !is_participant && !actor.is_admin {
        return Err(LifecycleError::Permission(
            "Only participants or an administrator can enter scores".to_string(),
        ));
    }
    Ok(())
}

/// Game delete: section must be open, actor must be the creator or an
/// administrator.
pub fn ensure_can_delete_game(actor: &Actor, section: &SectionModel) -> Result<(), LifecycleError> {
    if !section.is_open() {
        return Err(LifecycleError::InvalidState(
            "Games cannot be deleted from a closed section".to_string(),
        ));
    }
    if !manages_section(actor, section) {
        return Err(LifecycleError::Permission(
            "Only the section creator or an administrator can delete games".to_string(),
        ));
    }
    Ok(())
}
