use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserModel,
    repository::UserRepository,
    types::{CreateUserRequest, UpdateUserRequest, UserResponse},
};
use crate::{auth::Actor, shared::AppError};

const DISPLAY_NAME_MAX_CHARS: usize = 50;

/// Service for roster management. All mutations are admin-only; the
/// roster itself is what score entry and statistics resolve against.
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request))]
    pub async fn create_user(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<UserResponse, AppError> {
        require_admin(actor)?;

        let display_name = validate_display_name(&request.display_name)?;

        if self
            .repository
            .find_by_display_name(&display_name)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "This display name is already in use".to_string(),
            ));
        }

        let user = UserModel::new(display_name, request.is_admin);
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, display_name = %user.display_name, "User created successfully");
        Ok(user.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        require_admin(actor)?;

        let mut user = self
            .repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(display_name) = request.display_name {
            let display_name = validate_display_name(&display_name)?;

            // Uniqueness among active users, excluding the user itself
            if let Some(existing) = self.repository.find_by_display_name(&display_name).await? {
                if existing.id != user.id {
                    return Err(AppError::Validation(
                        "This display name is already in use".to_string(),
                    ));
                }
            }
            user.display_name = display_name;
        }

        if let Some(is_admin) = request.is_admin {
            user.is_admin = is_admin;
        }

        user.updated_at = Utc::now();
        self.repository.update_user(&user).await?;

        info!(user_id = %user.id, "User updated successfully");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, actor: &Actor, user_id: &str) -> Result<(), AppError> {
        require_admin(actor)?;

        self.repository.soft_delete_user(user_id).await?;

        info!(user_id = %user_id, "User soft-deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repository.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "Administrator privileges are required".to_string(),
        ))
    }
}

fn validate_display_name(display_name: &str) -> Result<String, AppError> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Display name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > DISPLAY_NAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Display name must be at most {} characters",
            DISPLAY_NAME_MAX_CHARS
        )));
    }
    Ok(trimmed.to_string())
}
