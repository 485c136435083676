//! Unified error handling for route handlers.
//!
//! Service errors convert into `ApiError`, which renders as a JSON body of
//! the shape `{"error": "<message>"}` with the matching status code. All
//! route handlers return `Result<T, ApiError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use shoplite_core::PageError;

use crate::db::StoreError;
use crate::services::{AuthError, CatalogError, UserError};

/// Application-level error type for the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Signup or login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Account management operation failed.
    #[error(transparent)]
    User(#[from] UserError),

    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid pagination parameters.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Store operation failed outside a service.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::AdminExists
                | AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash | AuthError::Token(_) | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::User(err) => match err {
                UserError::NotFound => StatusCode::NOT_FOUND,
                UserError::OnlyAdminDemotion
                | UserError::OnlyAdminDeletion
                | UserError::AdminExists
                | UserError::UsernameTaken
                | UserError::InvalidUsername(_)
                | UserError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                UserError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::MissingName | CatalogError::NegativePrice => StatusCode::BAD_REQUEST,
                CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Page(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request error");
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
