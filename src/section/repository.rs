use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use strum_macros::{Display, EnumString};
use tracing::{debug, instrument, warn};

use super::models::{SectionModel, SectionParticipant, SectionStatus};
use crate::shared::{AppError, RecordState};

/// Result of a compare-and-set status transition. A lost race between the
/// status check and the write comes back as Conflict, not as success.
#[derive(Debug, Clone)]
pub enum StatusTransition {
    /// Transition applied, returns the updated section
    Applied(SectionModel),
    /// Section was not in the expected status
    Conflict,
    /// Section does not exist (or is soft-deleted)
    NotFound,
}

/// Sort order for section listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter for section listings
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    pub status: Option<SectionStatus>,
    pub search: Option<String>,
    pub order: SortOrder,
}

/// Trait for section repository operations
#[async_trait]
pub trait SectionRepository {
    /// Atomically creates the section and its participant rows as one
    /// unit; a failed participant insert must leave no section row.
    async fn create_section(
        &self,
        section: &SectionModel,
        participants: &[SectionParticipant],
    ) -> Result<(), AppError>;

    async fn get_section(&self, section_id: &str) -> Result<Option<SectionModel>, AppError>;
    async fn list_sections(&self, filter: &SectionFilter) -> Result<Vec<SectionModel>, AppError>;
    async fn update_section(&self, section: &SectionModel) -> Result<(), AppError>;

    /// Compare-and-set status transition; `closed_at` is stored verbatim.
    async fn transition_status(
        &self,
        section_id: &str,
        from: SectionStatus,
        to: SectionStatus,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusTransition, AppError>;

    async fn soft_delete_section(&self, section_id: &str) -> Result<(), AppError>;

    /// Participants in their creation order
    async fn participants(&self, section_id: &str) -> Result<Vec<SectionParticipant>, AppError>;
    async fn is_participant(&self, section_id: &str, user_id: &str) -> Result<bool, AppError>;

    /// Closed sections whose closed_at falls in [from, to_exclusive)
    async fn closed_sections(
        &self,
        from: Option<DateTime<Utc>>,
        to_exclusive: Option<DateTime<Utc>>,
    ) -> Result<Vec<SectionModel>, AppError>;
}

/// In-memory implementation of SectionRepository for development and testing
pub struct InMemorySectionRepository {
    sections: Mutex<HashMap<String, SectionModel>>,
    participants: Mutex<HashMap<String, Vec<SectionParticipant>>>,
}

impl Default for InMemorySectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySectionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sections: Mutex::new(HashMap::new()),
            participants: Mutex::new(HashMap::new()),
        }
    }
}

fn is_live(section: &SectionModel) -> bool {
    section.state == RecordState::Active
}

#[async_trait]
impl SectionRepository for InMemorySectionRepository {
    #[instrument(skip(self, section, participants))]
    async fn create_section(
        &self,
        section: &SectionModel,
        participants: &[SectionParticipant],
    ) -> Result<(), AppError> {
        debug!(section_id = %section.id, name = %section.name, "Creating section in memory");

        let mut sections = self.sections.lock().unwrap();
        if sections.contains_key(&section.id) {
            warn!(section_id = %section.id, "Section already exists in memory");
            return Err(AppError::DatabaseError(
                "Section already exists".to_string(),
            ));
        }
        sections.insert(section.id.clone(), section.clone());
        self.participants
            .lock()
            .unwrap()
            .insert(section.id.clone(), participants.to_vec());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_section(&self, section_id: &str) -> Result<Option<SectionModel>, AppError> {
        let sections = self.sections.lock().unwrap();
        Ok(sections.get(section_id).filter(|s| is_live(s)).cloned())
    }

    #[instrument(skip(self))]
    async fn list_sections(&self, filter: &SectionFilter) -> Result<Vec<SectionModel>, AppError> {
        let sections = self.sections.lock().unwrap();
        let search_lower = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut list: Vec<SectionModel> = sections
            .values()
            .filter(|s| is_live(s))
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| {
                search_lower
                    .as_ref()
                    .map_or(true, |needle| s.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        match filter.order {
            SortOrder::Asc => list.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Desc => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        Ok(list)
    }

    #[instrument(skip(self, section))]
    async fn update_section(&self, section: &SectionModel) -> Result<(), AppError> {
        let mut sections = self.sections.lock().unwrap();
        match sections.get(&section.id) {
            Some(existing) if is_live(existing) => {
                sections.insert(section.id.clone(), section.clone());
                Ok(())
            }
            _ => {
                warn!(section_id = %section.id, "Section not found for update in memory");
                Err(AppError::NotFound("Section not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        section_id: &str,
        from: SectionStatus,
        to: SectionStatus,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusTransition, AppError> {
        let mut sections = self.sections.lock().unwrap();

        let section = match sections.get_mut(section_id) {
            Some(section) if is_live(section) => section,
            _ => {
                debug!(section_id = %section_id, "Section not found for status transition");
                return Ok(StatusTransition::NotFound);
            }
        };

        if section.status != from {
            debug!(
                section_id = %section_id,
                current = %section.status,
                expected = %from,
                "Status transition lost the race"
            );
            return Ok(StatusTransition::Conflict);
        }

        section.status = to;
        section.closed_at = closed_at;
        section.updated_at = Utc::now();

        Ok(StatusTransition::Applied(section.clone()))
    }

    #[instrument(skip(self))]
    async fn soft_delete_section(&self, section_id: &str) -> Result<(), AppError> {
        let mut sections = self.sections.lock().unwrap();
        match sections.get_mut(section_id) {
            Some(section) if is_live(section) => {
                section.state = RecordState::Deleted;
                section.updated_at = Utc::now();
                Ok(())
            }
            _ => {
                warn!(section_id = %section_id, "Section not found for deletion in memory");
                Err(AppError::NotFound("Section not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn participants(&self, section_id: &str) -> Result<Vec<SectionParticipant>, AppError> {
        let participants = self.participants.lock().unwrap();
        Ok(participants.get(section_id).cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn is_participant(&self, section_id: &str, user_id: &str) -> Result<bool, AppError> {
        let participants = self.participants.lock().unwrap();
        Ok(participants
            .get(section_id)
            .map(|list| list.iter().any(|p| p.user_id == user_id))
            .unwrap_or(false))
    }

    #[instrument(skip(self))]
    async fn closed_sections(
        &self,
        from: Option<DateTime<Utc>>,
        to_exclusive: Option<DateTime<Utc>>,
    ) -> Result<Vec<SectionModel>, AppError> {
        let sections = self.sections.lock().unwrap();
        let mut list: Vec<SectionModel> = sections
            .values()
            .filter(|s| is_live(s) && s.status == SectionStatus::Closed)
            .filter(|s| match s.closed_at {
                Some(closed_at) => {
                    from.map_or(true, |from| closed_at >= from)
                        && to_exclusive.map_or(true, |to| closed_at < to)
                }
                None => false,
            })
            .cloned()
            .collect();
        list.sort_by(|a, b| a.closed_at.cmp(&b.closed_at));
        Ok(list)
    }
}

/// PostgreSQL implementation of section repository
pub struct PostgresSectionRepository {
    pool: PgPool,
}

impl PostgresSectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SECTION_COLUMNS: &str = "id, name, starting_points, return_points, rate, player_count, status, created_by, closed_at, state, created_at, updated_at";

fn row_to_section(row: &sqlx::postgres::PgRow) -> Result<SectionModel, AppError> {
    let status: String = row.get("status");
    let state: String = row.get("state");
    Ok(SectionModel {
        id: row.get("id"),
        name: row.get("name"),
        starting_points: row.get("starting_points"),
        return_points: row.get("return_points"),
        rate: row.get("rate"),
        player_count: row.get("player_count"),
        status: SectionStatus::from_str(&status)
            .map_err(|_| AppError::DatabaseError(format!("Unknown section status: {}", status)))?,
        created_by: row.get("created_by"),
        closed_at: row.get("closed_at"),
        state: RecordState::from_str(&state)
            .map_err(|_| AppError::DatabaseError(format!("Unknown record state: {}", state)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl SectionRepository for PostgresSectionRepository {
    #[instrument(skip(self, section, participants))]
    async fn create_section(
        &self,
        section: &SectionModel,
        participants: &[SectionParticipant],
    ) -> Result<(), AppError> {
        debug!(section_id = %section.id, "Creating section in database");

        // Section and participant rows are one unit; dropping the
        // transaction before commit rolls the section row back.
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO sections (id, name, starting_points, return_points, rate, player_count, status, created_by, closed_at, state, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        )
        .bind(&section.id)
        .bind(&section.name)
        .bind(section.starting_points)
        .bind(section.return_points)
        .bind(section.rate)
        .bind(section.player_count)
        .bind(section.status.to_string())
        .bind(&section.created_by)
        .bind(section.closed_at)
        .bind(section.state.to_string())
        .bind(section.created_at)
        .bind(section.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert section");
            AppError::DatabaseError(e.to_string())
        })?;

        for participant in participants {
            sqlx::query(
                "INSERT INTO section_participants (id, section_id, user_id, seat) VALUES ($1, $2, $3, $4)",
            )
            .bind(&participant.id)
            .bind(&participant.section_id)
            .bind(&participant.user_id)
            .bind(participant.seat)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert section participant");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit section creation");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_section(&self, section_id: &str) -> Result<Option<SectionModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sections WHERE id = $1 AND state = 'active'",
            SECTION_COLUMNS
        ))
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to fetch section");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(row_to_section).transpose()
    }

    #[instrument(skip(self))]
    async fn list_sections(&self, filter: &SectionFilter) -> Result<Vec<SectionModel>, AppError> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(format!(
            "SELECT {} FROM sections WHERE state = 'active'",
            SECTION_COLUMNS
        ));

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(search) = &filter.search {
            builder
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", search));
        }
        builder.push(match filter.order {
            SortOrder::Asc => " ORDER BY created_at ASC",
            SortOrder::Desc => " ORDER BY created_at DESC",
        });

        let rows = builder.build().fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, "Failed to list sections");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(row_to_section).collect()
    }

    #[instrument(skip(self, section))]
    async fn update_section(&self, section: &SectionModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE sections SET name = $2, starting_points = $3, return_points = $4, rate = $5, updated_at = $6 \
             WHERE id = $1 AND state = 'active'"
        )
        .bind(&section.id)
        .bind(&section.name)
        .bind(section.starting_points)
        .bind(section.return_points)
        .bind(section.rate)
        .bind(section.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section.id, "Failed to update section");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(section_id = %section.id, "Section not found for update");
            return Err(AppError::NotFound("Section not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        section_id: &str,
        from: SectionStatus,
        to: SectionStatus,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusTransition, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE sections SET status = $3, closed_at = $4, updated_at = $5 \
             WHERE id = $1 AND status = $2 AND state = 'active' RETURNING {}",
            SECTION_COLUMNS
        ))
        .bind(section_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(closed_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to transition section status");
            AppError::DatabaseError(e.to_string())
        })?;

        if let Some(row) = row {
            return Ok(StatusTransition::Applied(row_to_section(&row)?));
        }

        // Nothing matched: either the section is gone or another writer
        // changed the status between check and write.
        match self.get_section(section_id).await? {
            Some(_) => Ok(StatusTransition::Conflict),
            None => Ok(StatusTransition::NotFound),
        }
    }

    #[instrument(skip(self))]
    async fn soft_delete_section(&self, section_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE sections SET state = 'deleted', updated_at = $2 WHERE id = $1 AND state = 'active'"
        )
        .bind(section_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to soft-delete section");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(section_id = %section_id, "Section not found for deletion");
            return Err(AppError::NotFound("Section not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn participants(&self, section_id: &str) -> Result<Vec<SectionParticipant>, AppError> {
        let rows = sqlx::query(
            "SELECT id, section_id, user_id, seat FROM section_participants WHERE section_id = $1 ORDER BY seat ASC",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, section_id = %section_id, "Failed to fetch participants");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .iter()
            .map(|row| SectionParticipant {
                id: row.get("id"),
                section_id: row.get("section_id"),
                user_id: row.get("user_id"),
                seat: row.get("seat"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn is_participant(&self, section_id: &str, user_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM section_participants WHERE section_id = $1 AND user_id = $2",
        )
        .bind(section_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to check participant membership");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.is_some())
    }

    #[instrument(skip(self))]
    async fn closed_sections(
        &self,
        from: Option<DateTime<Utc>>,
        to_exclusive: Option<DateTime<Utc>>,
    ) -> Result<Vec<SectionModel>, AppError> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(format!(
            "SELECT {} FROM sections WHERE state = 'active' AND status = 'closed' AND closed_at IS NOT NULL",
            SECTION_COLUMNS
        ));

        if let Some(from) = from {
            builder.push(" AND closed_at >= ").push_bind(from);
        }
        if let Some(to) = to_exclusive {
            builder.push(" AND closed_at < ").push_bind(to);
        }
        builder.push(" ORDER BY closed_at ASC");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, "Failed to list closed sections");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(row_to_section).collect()
    }
}
