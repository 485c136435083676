//! Document store access.
//!
//! # Database
//!
//! Stores all application data in two MongoDB collections:
//!
//! - `users` - accounts with their password hashes
//! - `products` - catalog products
//!
//! The policy and workflow services never touch collections directly; they
//! are injected with the [`AccountStore`] and [`CatalogStore`] capability
//! traits. Production wires in the MongoDB implementations from
//! [`users`] and [`products`]; the test suite uses the in-memory
//! implementations from [`memory`].

pub mod memory;
pub mod products;
pub mod users;

use async_trait::async_trait;
use mongodb::{Client, Database, bson::doc, error::ErrorKind, error::WriteFailure};
use secrecy::{ExposeSecret, SecretString};

use shoplite_core::{AccountId, ProductId};

use crate::models::{AccountPatch, NewAccount, NewProduct, Product, ProductPatch, User};

/// Errors produced by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database operation failed.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document could not be mapped back to a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Capability set over account records: create/find/update/delete/count.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account.
    ///
    /// Fails with [`StoreError::Conflict`] if the username is taken, or if
    /// the account would be a second admin.
    async fn create(&self, new: NewAccount) -> Result<User, StoreError>;

    /// Find an account by ID. An unknown or malformed ID yields `None`.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<User>, StoreError>;

    /// Find an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Find an account by username together with its password hash.
    async fn find_password_hash(&self, username: &str)
    -> Result<Option<(User, String)>, StoreError>;

    /// Count accounts holding the admin role.
    async fn count_admins(&self) -> Result<u64, StoreError>;

    /// Apply a partial update. Returns the updated account, or `None` if
    /// the ID is unknown. Fails with [`StoreError::Conflict`] if the patch
    /// violates a uniqueness constraint.
    async fn update(&self, id: &AccountId, patch: AccountPatch)
    -> Result<Option<User>, StoreError>;

    /// Delete an account. Returns whether a record was removed.
    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError>;

    /// List accounts in creation order.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<User>, StoreError>;

    /// Count all accounts.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Check that the store is reachable. Used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Capability set over product records: create/find/update/delete/count,
/// plus the approved-only pagination queries backing the public listing.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a new product.
    async fn create(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Find a product by ID. An unknown or malformed ID yields `None`.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Apply a partial update. Returns the updated product, or `None` if
    /// the ID is unknown.
    async fn update(&self, id: &ProductId, patch: ProductPatch)
    -> Result<Option<Product>, StoreError>;

    /// Delete a product. Returns whether a record was removed.
    async fn delete(&self, id: &ProductId) -> Result<bool, StoreError>;

    /// List approved, visible products in creation order.
    async fn list_approved(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError>;

    /// Count approved, visible products.
    async fn count_approved(&self) -> Result<u64, StoreError>;

    /// List all products in creation order, regardless of flags.
    async fn list_all(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError>;

    /// Count all products.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Connect to MongoDB and select the application database.
///
/// # Errors
///
/// Returns `mongodb::error::Error` if the connection string is invalid or
/// the initial handshake fails.
pub async fn connect(
    database_url: &SecretString,
    database_name: &str,
) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(database_url.expose_secret()).await?;
    Ok(client.database(database_name))
}

/// Whether a MongoDB error is a duplicate-key write error (code 11000).
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

/// Run a `ping` command against the database.
pub(crate) async fn ping_database(db: &Database) -> Result<(), StoreError> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
