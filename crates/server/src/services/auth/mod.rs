//! Authentication service.
//!
//! Handles signup and login against the account store. Passwords are hashed
//! with Argon2id; successful logins are answered with a signed bearer token
//! from the [`TokenService`].

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use shoplite_core::{Email, Role, Username};

use crate::db::{AccountStore, StoreError};
use crate::models::{NewAccount, User};
use crate::services::token::TokenService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Signup request body.
///
/// `role` defaults to [`Role::User`] when omitted; requesting
/// [`Role::Admin`] succeeds only while no admin account exists.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Authentication service.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self { accounts, tokens }
    }

    /// Register a new account.
    ///
    /// The admin check re-reads the current admin count immediately before
    /// the write. Two concurrent admin signups can both pass it; the MongoDB
    /// store's partial unique index turns the second insert into a
    /// [`StoreError::Conflict`], which surfaces here as `AdminExists`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`/`InvalidEmail` for malformed
    /// fields, `AuthError::WeakPassword` if the password is too short,
    /// `AuthError::AdminExists` if an admin role is requested while one
    /// exists, and `AuthError::UserAlreadyExists` for a taken username.
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        let username = Username::parse(&request.username)?;
        let email = request.email.as_deref().map(Email::parse).transpose()?;
        validate_password(&request.password)?;

        let role = request.role.unwrap_or_default();
        if role.is_admin() && self.accounts.count_admins().await? > 0 {
            return Err(AuthError::AdminExists);
        }

        if self
            .accounts
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;

        let user = self
            .accounts
            .create(NewAccount {
                username,
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(message) if message.contains("admin") => {
                    AuthError::AdminExists
                }
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        Ok(user)
    }

    /// Login with username and password, returning the account and a fresh
    /// bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` whether the username is
    /// unknown or the password mismatches.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let (user, password_hash) = self
            .accounts
            .find_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
