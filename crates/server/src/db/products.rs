//! MongoDB-backed catalog store.

use async_trait::async_trait;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    options::ReturnDocument,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use futures::TryStreamExt;
use shoplite_core::{AccountId, ProductId};

use super::users::{from_bson_datetime, parse_object_id, to_limit};
use super::{CatalogStore, StoreError};
use crate::models::{NewProduct, Product, ProductPatch};

/// Stored shape of a product in the `products` collection.
///
/// The price is stored as its canonical decimal string (the same
/// representation `rust_decimal` uses on the wire) to avoid binary
/// floating-point in the database.
#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    price: String,
    added_by: ObjectId,
    is_approved: bool,
    visible: bool,
    created_at: mongodb::bson::DateTime,
}

impl ProductDocument {
    fn into_domain(self) -> Result<Product, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::DataCorruption("product document missing _id".to_owned()))?;

        let price: Decimal = self
            .price
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("invalid price in database: {e}")))?;

        Ok(Product {
            id: ProductId::new(id.to_hex()),
            name: self.name,
            description: self.description,
            price,
            added_by: AccountId::new(self.added_by.to_hex()),
            is_approved: self.is_approved,
            visible: self.visible,
            created_at: from_bson_datetime(self.created_at)?,
        })
    }
}

/// Filter matching products shown in the public listing.
fn approved_filter() -> Document {
    doc! { "is_approved": true, "visible": true }
}

/// MongoDB implementation of [`CatalogStore`].
#[derive(Clone)]
pub struct MongoCatalogStore {
    collection: Collection<ProductDocument>,
}

impl MongoCatalogStore {
    /// Create a store over the `products` collection of `db`.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("products"),
        }
    }

    async fn list_filtered(
        &self,
        filter: Document,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, StoreError> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(to_limit(limit))
            .await?;

        let documents: Vec<ProductDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(ProductDocument::into_domain)
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    async fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        let added_by = parse_object_id(new.added_by.as_str()).ok_or_else(|| {
            StoreError::DataCorruption(format!("invalid owner id: {}", new.added_by))
        })?;

        let document = ProductDocument {
            id: None,
            name: new.name,
            description: new.description,
            price: new.price.to_string(),
            added_by,
            is_approved: new.is_approved,
            visible: new.visible,
            created_at: mongodb::bson::DateTime::now(),
        };

        let result = self.collection.insert_one(&document).await?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::DataCorruption("inserted _id is not an ObjectId".to_owned())
        })?;

        Ok(Product {
            id: ProductId::new(id.to_hex()),
            name: document.name,
            description: document.description,
            price: new.price,
            added_by: AccountId::new(added_by.to_hex()),
            is_approved: document.is_approved,
            visible: document.visible,
            created_at: from_bson_datetime(document.created_at)?,
        })
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(None);
        };
        match self.collection.find_one(doc! { "_id": oid }).await? {
            Some(document) => Ok(Some(document.into_domain()?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(None);
        };

        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut set = Document::new();
        if let Some(name) = &patch.name {
            set.insert("name", name);
        }
        if let Some(description) = &patch.description {
            set.insert("description", description);
        }
        if let Some(price) = patch.price {
            set.insert("price", price.to_string());
        }
        if let Some(is_approved) = patch.is_approved {
            set.insert("is_approved", is_approved);
        }
        if let Some(visible) = patch.visible {
            set.insert("visible", visible);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(document) => Ok(Some(document.into_domain()?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_approved(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        self.list_filtered(approved_filter(), skip, limit).await
    }

    async fn count_approved(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(approved_filter()).await?)
    }

    async fn list_all(&self, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        self.list_filtered(doc! {}, skip, limit).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
