//! User domain types.
//!
//! These types represent validated domain objects separate from the stored
//! document shapes. The password hash never appears on [`User`]; store
//! queries that need it return it alongside the user instead.

use chrono::{DateTime, Utc};

use shoplite_core::{AccountId, Email, Role, Username};

/// An account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique account ID, assigned by the store.
    pub id: AccountId,
    /// Unique username.
    pub username: Username,
    /// Optional email address.
    pub email: Option<Email>,
    /// Account role. At most one account holds [`Role::Admin`].
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub email: Option<Email>,
    /// Argon2id hash of the password, never the plaintext.
    pub password_hash: String,
    pub role: Role,
}

/// A partial update to an account.
///
/// Each field is independently omittable; `None` leaves the stored value
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub role: Option<Role>,
}

impl AccountPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.role.is_none()
    }
}
