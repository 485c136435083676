//! Catalog workflow service.
//!
//! Products are created by any authenticated account and start unapproved;
//! only an admin can approve, update, delete, or toggle the visibility of
//! a product. The public listing shows products that are both approved and
//! visible, with the creator's username populated from the account store.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use shoplite_core::{AccountId, Page, PageRequest, ProductId};

use crate::db::{AccountStore, CatalogStore, StoreError};
use crate::models::{NewProduct, Product, ProductListing, ProductPatch};

/// Errors produced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with the given ID.
    #[error("Product not found")]
    NotFound,

    /// The product name is missing or empty.
    #[error("product name is required")]
    MissingName,

    /// The price is negative.
    #[error("price must not be negative")]
    NegativePrice,

    /// Store error.
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

/// New product request body.
#[derive(Debug, Deserialize)]
pub struct NewProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Partial product update request body.
///
/// Each field is independently omittable; omitted fields are left
/// unchanged. Approval and visibility are not patchable here - they have
/// their own operations.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

/// Catalog workflow service.
pub struct CatalogService {
    products: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(products: Arc<dyn CatalogStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { products, accounts }
    }

    /// Create a product owned by `owner`. New products start unapproved
    /// and visible.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingName` for an empty name and
    /// `CatalogError::NegativePrice` for a negative price.
    pub async fn add(
        &self,
        owner: AccountId,
        request: NewProductRequest,
    ) -> Result<Product, CatalogError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }
        if request.price.is_sign_negative() {
            return Err(CatalogError::NegativePrice);
        }

        let product = self
            .products
            .create(NewProduct {
                name: name.to_owned(),
                description: request.description,
                price: request.price,
                added_by: owner,
                is_approved: false,
                visible: true,
            })
            .await?;

        Ok(product)
    }

    /// List approved, visible products with owner usernames.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if a store query fails.
    pub async fn list_approved(
        &self,
        request: PageRequest,
    ) -> Result<Page<ProductListing>, CatalogError> {
        let items = self
            .products
            .list_approved(request.skip(), request.page_size())
            .await?;
        let total_count = self.products.count_approved().await?;

        let listings = self.with_owner_usernames(items).await?;
        Ok(Page::new(listings, request, total_count))
    }

    /// List all products regardless of approval or visibility. Admin-only;
    /// the route layer enforces the role.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if a store query fails.
    pub async fn list_all(
        &self,
        request: PageRequest,
    ) -> Result<Page<ProductListing>, CatalogError> {
        let items = self
            .products
            .list_all(request.skip(), request.page_size())
            .await?;
        let total_count = self.products.count().await?;

        let listings = self.with_owner_usernames(items).await?;
        Ok(Page::new(listings, request, total_count))
    }

    /// Mark a product approved for the public listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the ID is unknown.
    pub async fn approve(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .update(
                id,
                ProductPatch {
                    is_approved: Some(true),
                    ..ProductPatch::default()
                },
            )
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Flip a product's visibility flag.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the ID is unknown.
    pub async fn toggle_visibility(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)?;

        self.products
            .update(
                id,
                ProductPatch {
                    visible: Some(!product.visible),
                    ..ProductPatch::default()
                },
            )
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the ID is unknown, and the same
    /// validation errors as [`CatalogService::add`] for patched fields.
    pub async fn update(
        &self,
        id: &ProductId,
        request: UpdateProductRequest,
    ) -> Result<Product, CatalogError> {
        if let Some(name) = &request.name
            && name.trim().is_empty()
        {
            return Err(CatalogError::MissingName);
        }
        if let Some(price) = request.price
            && price.is_sign_negative()
        {
            return Err(CatalogError::NegativePrice);
        }

        self.products
            .update(
                id,
                ProductPatch {
                    name: request.name.map(|n| n.trim().to_owned()),
                    description: request.description,
                    price: request.price,
                    ..ProductPatch::default()
                },
            )
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the ID is unknown.
    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    /// Join products with their creators' usernames. One lookup per
    /// distinct owner on the page.
    async fn with_owner_usernames(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductListing>, CatalogError> {
        let mut usernames: HashMap<AccountId, Option<String>> = HashMap::new();

        for product in &products {
            if !usernames.contains_key(&product.added_by) {
                let username = self
                    .accounts
                    .find_by_id(&product.added_by)
                    .await?
                    .map(|user| user.username.as_str().to_owned());
                usernames.insert(product.added_by.clone(), username);
            }
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let added_by_username = usernames
                    .get(&product.added_by)
                    .cloned()
                    .flatten();
                ProductListing {
                    product,
                    added_by_username,
                }
            })
            .collect())
    }
}
