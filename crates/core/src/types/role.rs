//! Account roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The role assigned to an account.
///
/// Serialized in lowercase (`"user"` / `"admin"`) both in request bodies
/// and in stored documents. System-wide, at most one account may hold
/// [`Role::Admin`] at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account. The default for new signups.
    #[default]
    User,
    /// Administrator. At most one admin account may exist.
    Admin,
}

impl Role {
    /// Whether this role grants administrative access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The lowercase wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
