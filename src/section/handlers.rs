use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::SectionStatus,
    repository::{SectionFilter, SortOrder},
    service::SectionService,
    types::{
        CreateSectionRequest, ListSectionsQuery, SectionResponse, SectionSummaryResponse,
        UpdateSectionRequest,
    },
};
use crate::{
    auth::Actor,
    shared::{AppError, AppState},
};

fn service(state: &AppState) -> SectionService {
    SectionService::new(
        Arc::clone(&state.section_repository),
        Arc::clone(&state.game_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for creating a new section
///
/// POST /sections
#[instrument(name = "create_section", skip(state, request))]
pub async fn create_section(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateSectionRequest>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = service(&state).create_section(&actor, request).await?;
    Ok(Json(section))
}

/// HTTP handler for listing sections with optional filters
///
/// GET /sections?status=&search=&order=
#[instrument(name = "list_sections", skip(state))]
pub async fn list_sections(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(query): Query<ListSectionsQuery>,
) -> Result<Json<Vec<SectionResponse>>, AppError> {
    let filter = parse_filter(&query)?;
    let sections = service(&state).list_sections(&filter).await?;
    Ok(Json(sections))
}

/// HTTP handler for a single section's detail
///
/// GET /sections/{section_id}
#[instrument(name = "get_section", skip(state))]
pub async fn get_section(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = service(&state).get_section(&section_id).await?;
    Ok(Json(section))
}

/// HTTP handler for updating a section's settings
///
/// PATCH /sections/{section_id}
#[instrument(name = "update_section", skip(state, request))]
pub async fn update_section(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(section_id): Path<String>,
    Json(request): Json<UpdateSectionRequest>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = service(&state)
        .update_section(&actor, &section_id, request)
        .await?;
    Ok(Json(section))
}

/// HTTP handler for soft-deleting a section
///
/// DELETE /sections/{section_id}
#[instrument(name = "delete_section", skip(state))]
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_section(&actor, &section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// HTTP handler for closing a section
///
/// POST /sections/{section_id}/close
#[instrument(name = "close_section", skip(state))]
pub async fn close_section(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = service(&state).close_section(&actor, &section_id).await?;
    Ok(Json(section))
}

/// HTTP handler for reopening a closed section
///
/// POST /sections/{section_id}/reopen
#[instrument(name = "reopen_section", skip(state))]
pub async fn reopen_section(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = service(&state).reopen_section(&actor, &section_id).await?;
    Ok(Json(section))
}

/// HTTP handler for the per-participant section summary
///
/// GET /sections/{section_id}/summary
#[instrument(name = "section_summary", skip(state))]
pub async fn section_summary(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(section_id): Path<String>,
) -> Result<Json<SectionSummaryResponse>, AppError> {
    let summary = service(&state).summary(&section_id).await?;
    Ok(Json(summary))
}

fn parse_filter(query: &ListSectionsQuery) -> Result<SectionFilter, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            SectionStatus::from_str(s)
                .map_err(|_| AppError::Validation(format!("Unknown status filter: {}", s)))
        })
        .transpose()?;

    let order = query
        .order
        .as_deref()
        .map(|s| {
            SortOrder::from_str(s)
                .map_err(|_| AppError::Validation(format!("Unknown sort order: {}", s)))
        })
        .transpose()?
        .unwrap_or_default();

    Ok(SectionFilter {
        status,
        search: query.search.clone(),
        order,
    })
}
