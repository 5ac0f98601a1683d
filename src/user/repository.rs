use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::{AppError, RecordState};

/// Trait for user repository operations. Lookups resolve active users
/// only; `display_names` is the one deliberate exception so historical
/// score rows keep rendering after a user is soft-deleted.
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_display_name(&self, display_name: &str)
        -> Result<Option<UserModel>, AppError>;
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError>;
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn soft_delete_user(&self, user_id: &str) -> Result<(), AppError>;

    /// Resolves display names for the given ids, deleted users included.
    async fn display_names(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, display_name = %user.display_name, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(user_id).filter(|u| u.is_active()).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.is_active() && u.display_name == display_name)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        let mut list: Vec<UserModel> = users.values().filter(|u| u.is_active()).cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Updating user in memory");

        let mut users = self.users.lock().unwrap();
        match users.get(&user.id) {
            Some(existing) if existing.is_active() => {
                users.insert(user.id.clone(), user.clone());
                Ok(())
            }
            _ => {
                warn!(user_id = %user.id, "User not found for update in memory");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn soft_delete_user(&self, user_id: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Soft-deleting user in memory");

        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(user) if user.is_active() => {
                user.state = RecordState::Deleted;
                user.updated_at = Utc::now();
                Ok(())
            }
            _ => {
                warn!(user_id = %user_id, "User not found for deletion in memory");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn display_names(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| {
                users
                    .get(id)
                    .map(|u| (id.clone(), u.display_name.clone()))
            })
            .collect())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserModel, AppError> {
    let state: String = row.get("state");
    Ok(UserModel {
        id: row.get("id"),
        display_name: row.get("display_name"),
        is_admin: row.get("is_admin"),
        state: RecordState::from_str(&state)
            .map_err(|_| AppError::DatabaseError(format!("Unknown record state: {}", state)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, display_name = %user.display_name, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, display_name, is_admin, state, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(user.is_admin)
        .bind(user.state.to_string())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, display_name, is_admin, state, created_at, updated_at FROM users WHERE id = $1 AND state = 'active'"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(row_to_user).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, display_name, is_admin, state, created_at, updated_at FROM users WHERE display_name = $1 AND state = 'active'"
        )
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to search user by display name");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(row_to_user).transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, display_name, is_admin, state, created_at, updated_at FROM users WHERE state = 'active' ORDER BY created_at ASC"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list users from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(row_to_user).collect()
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Updating user in database");

        let result = sqlx::query(
            "UPDATE users SET display_name = $2, is_admin = $3, updated_at = $4 WHERE id = $1 AND state = 'active'"
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(user.is_admin)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.id, "Failed to update user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user.id, "User not found for update");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete_user(&self, user_id: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Soft-deleting user in database");

        let result = sqlx::query(
            "UPDATE users SET state = 'deleted', updated_at = $2 WHERE id = $1 AND state = 'active'"
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to soft-delete user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn display_names(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, AppError> {
        let rows = sqlx::query("SELECT id, display_name FROM users WHERE id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to resolve display names");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("display_name")))
            .collect())
    }
}
