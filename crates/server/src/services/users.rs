//! Account management service.
//!
//! Admin-only account operations: listing, partial update, and deletion.
//! This is where the single-admin invariant is enforced: every mutation
//! that could change the admin population re-reads the current admin count
//! before writing. The check-then-act sequence is racy under concurrent
//! requests; the MongoDB account store closes the race with a partial
//! unique index on `role == "admin"`.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use shoplite_core::{AccountId, Email, Page, PageRequest, Role, Username};

use crate::db::{AccountStore, StoreError};
use crate::models::{AccountPatch, User};

/// Errors produced by account management operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// No account with the given ID.
    #[error("User not found")]
    NotFound,

    /// Refused to demote the only admin.
    #[error("There must be at least one admin. You cannot change the only admin to user.")]
    OnlyAdminDemotion,

    /// Refused to delete the only admin.
    #[error("There must be at least one admin. You cannot delete the only admin.")]
    OnlyAdminDeletion,

    /// Refused to promote while an admin account exists.
    #[error("There can only be one admin. Please assign the role as user.")]
    AdminExists,

    /// The requested username is already registered.
    #[error("Username already taken")]
    UsernameTaken,

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] shoplite_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shoplite_core::EmailError),

    /// Store error.
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

/// Partial account update request body.
///
/// Each field is independently omittable; omitted fields are left
/// unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Account management service.
pub struct UserService {
    accounts: Arc<dyn AccountStore>,
}

impl UserService {
    /// Create a new account management service.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Apply a partial update to an account.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the ID is unknown,
    /// `UserError::OnlyAdminDemotion` when the patch would demote the sole
    /// admin, and `UserError::AdminExists` when it would promote a second
    /// account to admin.
    pub async fn update(
        &self,
        id: &AccountId,
        request: UpdateAccountRequest,
    ) -> Result<User, UserError> {
        let patch = AccountPatch {
            username: request
                .username
                .as_deref()
                .map(Username::parse)
                .transpose()?,
            email: request.email.as_deref().map(Email::parse).transpose()?,
            role: request.role,
        };

        let current = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        if let Some(role) = patch.role {
            if current.role.is_admin()
                && role == Role::User
                && self.accounts.count_admins().await? <= 1
            {
                return Err(UserError::OnlyAdminDemotion);
            }

            if role.is_admin()
                && !current.role.is_admin()
                && self.accounts.count_admins().await? >= 1
            {
                return Err(UserError::AdminExists);
            }
        }

        let updated = self
            .accounts
            .update(id, patch)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(message) if message.contains("admin") => UserError::AdminExists,
                StoreError::Conflict(_) => UserError::UsernameTaken,
                other => UserError::Store(other),
            })?
            .ok_or(UserError::NotFound)?;

        Ok(updated)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the ID is unknown and
    /// `UserError::OnlyAdminDeletion` if the account is the sole admin.
    pub async fn delete(&self, id: &AccountId) -> Result<(), UserError> {
        let user = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        if user.role.is_admin() && self.accounts.count_admins().await? <= 1 {
            return Err(UserError::OnlyAdminDeletion);
        }

        if !self.accounts.delete(id).await? {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    /// List accounts, paginated in creation order.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Store` if a store query fails.
    pub async fn list(&self, request: PageRequest) -> Result<Page<User>, UserError> {
        let items = self
            .accounts
            .list(request.skip(), request.page_size())
            .await?;
        let total_count = self.accounts.count().await?;
        Ok(Page::new(items, request, total_count))
    }

    /// Look up an account by username.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no account has the username.
    pub async fn find_by_username(&self, username: &str) -> Result<User, UserError> {
        self.accounts
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::memory::MemoryAccountStore;
    use crate::models::NewAccount;

    async fn seed(accounts: &MemoryAccountStore, username: &str, role: Role) -> User {
        accounts
            .create(NewAccount {
                username: Username::parse(username).unwrap(),
                email: None,
                password_hash: "$argon2id$stub".to_owned(),
                role,
            })
            .await
            .unwrap()
    }

    fn service(accounts: Arc<MemoryAccountStore>) -> UserService {
        UserService::new(accounts)
    }

    #[tokio::test]
    async fn test_delete_sole_admin_fails_and_account_remains() {
        let accounts = Arc::new(MemoryAccountStore::new());
        let admin = seed(&accounts, "alice", Role::Admin).await;
        let users = service(Arc::clone(&accounts));

        let err = users.delete(&admin.id).await.unwrap_err();
        assert!(matches!(err, UserError::OnlyAdminDeletion));
        assert!(err.to_string().contains("cannot delete the only admin"));

        // The account must still be present afterward.
        assert!(accounts.find_by_id(&admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_non_admin_succeeds() {
        let accounts = Arc::new(MemoryAccountStore::new());
        seed(&accounts, "alice", Role::Admin).await;
        let bob = seed(&accounts, "bob", Role::User).await;
        let users = service(Arc::clone(&accounts));

        users.delete(&bob.id).await.unwrap();
        assert!(accounts.find_by_id(&bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_non_sole_admin_succeeds() {
        // Two admins can only exist by seeding the store directly; the
        // policy layer never lets a second one in. The deletion rule still
        // has to handle the state correctly.
        let accounts = Arc::new(MemoryAccountStore::new());
        seed(&accounts, "alice", Role::Admin).await;
        let second = seed(&accounts, "eve", Role::Admin).await;
        let users = service(Arc::clone(&accounts));

        users.delete(&second.id).await.unwrap();
        assert_eq!(accounts.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_not_found() {
        let accounts = Arc::new(MemoryAccountStore::new());
        let users = service(accounts);

        let err = users.delete(&AccountId::new("missing")).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_promote_second_admin_fails() {
        let accounts = Arc::new(MemoryAccountStore::new());
        seed(&accounts, "alice", Role::Admin).await;
        let bob = seed(&accounts, "bob", Role::User).await;
        let users = service(Arc::clone(&accounts));

        let request = UpdateAccountRequest {
            role: Some(Role::Admin),
            ..UpdateAccountRequest::default()
        };
        let err = users.update(&bob.id, request).await.unwrap_err();
        assert!(matches!(err, UserError::AdminExists));
        assert_eq!(accounts.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_demote_sole_admin_fails() {
        let accounts = Arc::new(MemoryAccountStore::new());
        let admin = seed(&accounts, "alice", Role::Admin).await;
        let users = service(Arc::clone(&accounts));

        let request = UpdateAccountRequest {
            role: Some(Role::User),
            ..UpdateAccountRequest::default()
        };
        let err = users.update(&admin.id, request).await.unwrap_err();
        assert!(matches!(err, UserError::OnlyAdminDemotion));
    }

    #[tokio::test]
    async fn test_sole_admin_keeping_admin_role_is_allowed() {
        // A patch that re-states the current admin role is not a promotion
        // and must not trip the invariant check.
        let accounts = Arc::new(MemoryAccountStore::new());
        let admin = seed(&accounts, "alice", Role::Admin).await;
        let users = service(Arc::clone(&accounts));

        let request = UpdateAccountRequest {
            username: Some("alice-renamed".to_owned()),
            role: Some(Role::Admin),
            ..UpdateAccountRequest::default()
        };
        let updated = users.update(&admin.id, request).await.unwrap();
        assert_eq!(updated.username.as_str(), "alice-renamed");
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_promotion_succeeds_when_no_admin_exists() {
        let accounts = Arc::new(MemoryAccountStore::new());
        let bob = seed(&accounts, "bob", Role::User).await;
        let users = service(Arc::clone(&accounts));

        let request = UpdateAccountRequest {
            role: Some(Role::Admin),
            ..UpdateAccountRequest::default()
        };
        let updated = users.update(&bob.id, request).await.unwrap();
        assert!(updated.role.is_admin());
        assert_eq!(accounts.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admin_count_stays_at_most_one_through_sequences() {
        // Property from the admin invariant: across a sequence of policy
        // operations the admin count never exceeds one.
        let accounts = Arc::new(MemoryAccountStore::new());
        let alice = seed(&accounts, "alice", Role::Admin).await;
        let bob = seed(&accounts, "bob", Role::User).await;
        let carol = seed(&accounts, "carol", Role::User).await;
        let users = service(Arc::clone(&accounts));

        let promote = || UpdateAccountRequest {
            role: Some(Role::Admin),
            ..UpdateAccountRequest::default()
        };
        let demote = || UpdateAccountRequest {
            role: Some(Role::User),
            ..UpdateAccountRequest::default()
        };

        let _ = users.update(&bob.id, promote()).await;
        assert!(accounts.count_admins().await.unwrap() <= 1);

        let _ = users.update(&alice.id, demote()).await;
        assert!(accounts.count_admins().await.unwrap() <= 1);

        let _ = users.delete(&alice.id).await;
        let _ = users.update(&carol.id, promote()).await;
        assert!(accounts.count_admins().await.unwrap() <= 1);
    }

    #[tokio::test]
    async fn test_list_pagination_metadata() {
        let accounts = Arc::new(MemoryAccountStore::new());
        for i in 0..15 {
            seed(&accounts, &format!("user-{i:02}"), Role::User).await;
        }
        let users = service(accounts);

        let page = users
            .list(PageRequest::new(2, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_count, 15);
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let accounts = Arc::new(MemoryAccountStore::new());
        seed(&accounts, "alice", Role::User).await;
        let users = service(accounts);

        assert_eq!(
            users.find_by_username("alice").await.unwrap().username.as_str(),
            "alice"
        );
        assert!(matches!(
            users.find_by_username("mallory").await,
            Err(UserError::NotFound)
        ));
    }
}
