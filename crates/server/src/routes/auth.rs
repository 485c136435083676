//! Signup and login handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::routes::users::UserResponse;
use crate::services::SignupRequest;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth().signup(request).await?;

    tracing::info!(username = %user.username, role = %user.role, "account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": UserResponse::from(user),
        })),
    ))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state
        .auth()
        .login(&request.username, &request.password)
        .await?;

    tracing::debug!(username = %user.username, "login succeeded");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
    })))
}
