//! In-memory store implementations.
//!
//! Used by the test suite in place of MongoDB. Unlike the MongoDB account
//! store there is no partial unique index here: the single-admin invariant
//! is enforced only by the service-level check-then-act sequence, which is
//! racy under concurrent writes. The tests drive the stores sequentially,
//! so the race cannot be observed there.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use shoplite_core::{AccountId, ProductId};

use super::{AccountStore, CatalogStore, StoreError};
use crate::models::{AccountPatch, NewAccount, NewProduct, Product, ProductPatch, User};

struct StoredAccount {
    user: User,
    password_hash: String,
}

/// In-memory implementation of [`AccountStore`].
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<StoredAccount>>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, new: NewAccount) -> Result<User, StoreError> {
        let mut accounts = lock(&self.accounts);

        if accounts
            .iter()
            .any(|a| a.user.username.as_str() == new.username.as_str())
        {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }

        let user = User {
            id: AccountId::new(Uuid::new_v4().to_string()),
            username: new.username,
            email: new.email,
            role: new.role,
            created_at: Utc::now(),
        };
        accounts.push(StoredAccount {
            user: user.clone(),
            password_hash: new.password_hash,
        });

        Ok(user)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<User>, StoreError> {
        let accounts = lock(&self.accounts);
        Ok(accounts
            .iter()
            .find(|a| &a.user.id == id)
            .map(|a| a.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let accounts = lock(&self.accounts);
        Ok(accounts
            .iter()
            .find(|a| a.user.username.as_str() == username)
            .map(|a| a.user.clone()))
    }

    async fn find_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, StoreError> {
        let accounts = lock(&self.accounts);
        Ok(accounts
            .iter()
            .find(|a| a.user.username.as_str() == username)
            .map(|a| (a.user.clone(), a.password_hash.clone())))
    }

    async fn count_admins(&self) -> Result<u64, StoreError> {
        let accounts = lock(&self.accounts);
        Ok(accounts.iter().filter(|a| a.user.role.is_admin()).count() as u64)
    }

    async fn update(
        &self,
        id: &AccountId,
        patch: AccountPatch,
    ) -> Result<Option<User>, StoreError> {
        let mut accounts = lock(&self.accounts);

        if let Some(username) = &patch.username
            && accounts
                .iter()
                .any(|a| &a.user.id != id && a.user.username.as_str() == username.as_str())
        {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }

        let Some(stored) = accounts.iter_mut().find(|a| &a.user.id == id) else {
            return Ok(None);
        };

        if let Some(username) = patch.username {
            stored.user.username = username;
        }
        if let Some(email) = patch.email {
            stored.user.email = Some(email);
        }
        if let Some(role) = patch.role {
            stored.user.role = role;
        }

        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError> {
        let mut accounts = lock(&self.accounts);
        let before = accounts.len();
        accounts.retain(|a| &a.user.id != id);
        Ok(accounts.len() < before)
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<User>, StoreError> {
        let accounts = lock(&self.accounts);
        Ok(accounts
            .iter()
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .map(|a| a.user.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.accounts).len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory implementation of [`CatalogStore`].
#[derive(Default)]
pub struct MemoryCatalogStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryCatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_listed(product: &Product) -> bool {
    product.is_approved && product.visible
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut products = lock(&self.products);
        let product = Product {
            id: ProductId::new(Uuid::new_v4().to_string()),
            name: new.name,
            description: new.description,
            price: new.price,
            added_by: new.added_by,
            is_approved: new.is_approved,
            visible: new.visible,
            created_at: Utc::now(),
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = lock(&self.products);
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = lock(&self.products);
        let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(is_approved) = patch.is_approved {
            product.is_approved = is_approved;
        }
        if let Some(visible) = patch.visible {
            product.visible = visible;
        }

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        let mut products = lock(&self.products);
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() < before)
    }

    async fn list_approved(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let products = lock(&self.products);
        Ok(products
            .iter()
            .filter(|p| is_listed(p))
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn count_approved(&self) -> Result<u64, StoreError> {
        let products = lock(&self.products);
        Ok(products.iter().filter(|p| is_listed(p)).count() as u64)
    }

    async fn list_all(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let products = lock(&self.products);
        Ok(products
            .iter()
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.products).len() as u64)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
