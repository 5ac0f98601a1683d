use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::UserService,
    types::{CreateUserRequest, UpdateUserRequest, UserResponse},
};
use crate::{
    auth::Actor,
    shared::{AppError, AppState},
};

/// HTTP handler for creating a roster user (admin only)
///
/// POST /users
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.create_user(&actor, request).await?;
    Ok(Json(user))
}

/// HTTP handler for listing active roster users
///
/// GET /users
#[instrument(name = "list_users", skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// HTTP handler for updating a roster user (admin only)
///
/// PATCH /users/{user_id}
#[instrument(name = "update_user", skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.update_user(&actor, &user_id, request).await?;
    Ok(Json(user))
}

/// HTTP handler for soft-deleting a roster user (admin only)
///
/// DELETE /users/{user_id}
#[instrument(name = "delete_user", skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    service.delete_user(&actor, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app_with_actor(actor: Actor) -> Router {
        let app_state = AppStateBuilder::new().build();
        Router::new()
            .route(
                "/users",
                axum::routing::post(create_user).get(list_users),
            )
            .layer(Extension(actor))
            .with_state(app_state)
    }

    #[tokio::test]
    async fn test_create_user_handler_as_admin() {
        let app = app_with_actor(Actor {
            id: "admin".to_string(),
            is_admin: true,
        });

        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"display_name": "alice"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let user: UserResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.display_name, "alice");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_create_user_handler_rejects_non_admin() {
        let app = app_with_actor(Actor {
            id: "plain".to_string(),
            is_admin: false,
        });

        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"display_name": "alice"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_users_handler_empty() {
        let app = app_with_actor(Actor {
            id: "plain".to_string(),
            is_admin: false,
        });

        let request = Request::builder()
            .method("GET")
            .uri("/users")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let users: Vec<UserResponse> = serde_json::from_slice(&body).unwrap();
        assert!(users.is_empty());
    }
}
