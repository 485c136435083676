//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::services::token::TokenError;

/// Errors that can occur during signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] shoplite_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shoplite_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Signup requested the admin role while an admin account exists.
    #[error("There can be only one admin")]
    AdminExists,

    /// The username is already registered.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Invalid credentials (wrong password or unknown username).
    ///
    /// Deliberately a single variant so a login failure never reveals
    /// whether the username exists.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token issuance error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Store error.
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}
