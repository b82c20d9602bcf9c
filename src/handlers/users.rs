use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, CurrentUser};
use crate::entities::{UserModel, UserRole};
use crate::errors::ServiceError;
use crate::handlers::common::{parse_limit, parse_page, success_response, MessageResponse, PaginationMeta};
use crate::services::catalog::ADMIN_PAGE_SIZE;
use crate::services::users::{DirectoryQuery, UpdateUserInput};
use crate::AppState;

/// Creates the router for user endpoints
pub fn users_routes(state: AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(current_user))
        .with_auth(state.clone());

    let admin = Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id", put(update_user))
        .route("/:id", delete(delete_user))
        .with_admin(state);

    me.merge(admin)
}

// Request/Response DTOs

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "role": "admin", "isActive": true }))]
pub struct UpdateUserRequest {
    /// New role, when changing it
    pub role: Option<UserRole>,
    /// New active flag, when changing it
    #[serde(default, alias = "isActive")]
    pub is_active: Option<bool>,
}

/// User record as exposed over the API. The identity-provider id is
/// intentionally absent.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "email": "jane@example.com",
    "first_name": "Jane",
    "last_name": "Doe",
    "role": "user",
    "is_active": true,
    "avatar_url": null,
    "last_login": "2024-12-09T10:30:00Z",
    "created_at": "2024-12-01T08:00:00Z",
    "updated_at": "2024-12-09T10:30:00Z"
}))]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role,
            is_active: model.is_active,
            avatar_url: model.avatar_url,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PaginationMeta,
}

// Handler functions

/// Current bound user record
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Users"
)]
pub async fn current_user(user: CurrentUser) -> Result<axum::response::Response, ServiceError> {
    Ok(success_response(UserResponse::from(user.0)))
}

/// Paginated, searchable user listing
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListParams),
    responses(
        (status = 200, description = "User directory page", body = UserListResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<axum::response::Response, ServiceError> {
    let query = DirectoryQuery {
        page: parse_page(params.page.as_deref()),
        limit: parse_limit(params.limit.as_deref(), ADMIN_PAGE_SIZE),
        search: params.search.filter(|s| !s.trim().is_empty()),
    };

    let page = state.services.users.search_users(query).await?;

    Ok(success_response(UserListResponse {
        users: page.users.into_iter().map(UserResponse::from).collect(),
        pagination: PaginationMeta {
            current: page.current,
            pages: page.pages,
            total: page.total,
        },
    }))
}

/// Single user detail
#[utoipa::path(
    get,
    path = "/api/users/:id",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, ServiceError> {
    let user = state.services.users.get_user(id).await?;
    Ok(success_response(UserResponse::from(user)))
}

/// Update a user's role or active flag
#[utoipa::path(
    put,
    path = "/api/users/:id",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<axum::response::Response, ServiceError> {
    let user = state
        .services
        .users
        .update_user(
            id,
            UpdateUserInput {
                role: payload.role,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(success_response(UserResponse::from(user)))
}

/// Delete a user (refused for the last remaining admin)
#[utoipa::path(
    delete,
    path = "/api/users/:id",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Last admin cannot be deleted", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, ServiceError> {
    state.services.users.delete_user(id).await?;
    Ok(success_response(MessageResponse::new(
        "User deleted successfully",
    )))
}
