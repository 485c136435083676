//! Authentication extractors.
//!
//! Handlers opt into authentication by taking one of these extractors as an
//! argument. Tokens arrive as `Authorization: Bearer <token>` headers and
//! are verified statelessly; no session storage is involved.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use shoplite_core::{AccountId, Role};

use crate::services::TokenError;
use crate::state::AppState;

/// The authenticated caller, as asserted by a verified bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: AccountId,
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error returned when a request fails authentication or authorization.
#[derive(Debug)]
pub enum AuthRejection {
    /// No bearer token on the request.
    MissingToken,
    /// The token failed verification (bad signature, expired, malformed).
    InvalidToken,
    /// Authenticated, but the admin role is required.
    NotAdmin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Access denied"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin access only"),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state)?;
        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer token carrying the admin role.
///
/// Missing or invalid tokens are rejected with 401 before the role is
/// considered; a valid non-admin token gets 403.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state)?;

        if !user.is_admin() {
            return Err(AuthRejection::NotAdmin);
        }

        Ok(Self(user))
    }
}

/// Pull the bearer token off the request and verify it.
fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

    let claims = state.tokens().verify(token).map_err(|e| match e {
        TokenError::Expired | TokenError::Invalid | TokenError::Signing => {
            AuthRejection::InvalidToken
        }
    })?;

    Ok(CurrentUser {
        id: claims.sub,
        role: claims.role,
    })
}

/// Extract the token from an `Authorization: Bearer` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
