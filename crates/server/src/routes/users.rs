//! User administration handlers. All admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use shoplite_core::{AccountId, PageRequest, Role};

use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::UpdateAccountRequest;
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub(crate) fn to_page_request(&self) -> Result<PageRequest, shoplite_core::PageError> {
        PageRequest::from_query(self.page, self.limit)
    }
}

/// An account as rendered to clients. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username.as_str().to_owned(),
            email: user.email.map(|e| e.as_str().to_owned()),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// `GET /users`
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.users().list(query.to_page_request()?).await?;

    let users: Vec<UserResponse> = page.items.into_iter().map(UserResponse::from).collect();

    Ok(Json(json!({
        "message": "Users retrieved successfully",
        "users": users,
        "totalCount": page.total_count,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
    })))
}

/// `GET /users/{username}`
pub async fn find_by_username(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users().find_by_username(&username).await?;

    Ok(Json(json!({
        "message": "User found successfully",
        "user": UserResponse::from(user),
    })))
}

/// `PUT /users/{id}`
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users().update(&AccountId::new(id), request).await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserResponse::from(user),
    })))
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.users().delete(&AccountId::new(id)).await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
