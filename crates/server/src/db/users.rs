//! MongoDB-backed account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use futures::TryStreamExt;
use shoplite_core::{AccountId, Email, Role, Username};

use super::{AccountStore, StoreError, is_duplicate_key, ping_database};
use crate::models::{AccountPatch, NewAccount, User};

/// Name of the unique index on `username`.
const USERNAME_INDEX: &str = "username_unique";
/// Name of the partial unique index enforcing the single-admin invariant.
const ADMIN_INDEX: &str = "role_admin_unique";

/// Stored shape of an account in the `users` collection.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    password_hash: String,
    role: Role,
    created_at: mongodb::bson::DateTime,
}

impl UserDocument {
    fn into_domain(self) -> Result<User, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::DataCorruption("user document missing _id".to_owned()))?;

        let username = Username::parse(&self.username)
            .map_err(|e| StoreError::DataCorruption(format!("invalid username in database: {e}")))?;

        let email = self
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| StoreError::DataCorruption(format!("invalid email in database: {e}")))?;

        Ok(User {
            id: AccountId::new(id.to_hex()),
            username,
            email,
            role: self.role,
            created_at: from_bson_datetime(self.created_at)?,
        })
    }
}

/// MongoDB implementation of [`AccountStore`].
#[derive(Clone)]
pub struct MongoAccountStore {
    db: Database,
    collection: Collection<UserDocument>,
}

impl MongoAccountStore {
    /// Create a store over the `users` collection of `db`.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection("users"),
        }
    }

    /// Create the collection indexes.
    ///
    /// Besides the uniqueness of usernames, this installs a partial unique
    /// index on `role == "admin"`: the policy checks in the user service are
    /// check-then-act and therefore racy under concurrent writes, and this
    /// index is the atomic backstop that keeps a second admin out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if index creation fails.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .name(USERNAME_INDEX.to_owned())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "role": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .partial_filter_expression(doc! { "role": "admin" })
                            .name(ADMIN_INDEX.to_owned())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        Ok(())
    }

    async fn find_document(&self, filter: Document) -> Result<Option<User>, StoreError> {
        match self.collection.find_one(filter).await? {
            Some(document) => Ok(Some(document.into_domain()?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStore for MongoAccountStore {
    async fn create(&self, new: NewAccount) -> Result<User, StoreError> {
        let document = UserDocument {
            id: None,
            username: new.username.as_str().to_owned(),
            email: new.email.as_ref().map(|e| e.as_str().to_owned()),
            password_hash: new.password_hash,
            role: new.role,
            created_at: mongodb::bson::DateTime::now(),
        };

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| map_duplicate_key(e, "username already exists"))?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::DataCorruption("inserted _id is not an ObjectId".to_owned())
        })?;

        Ok(User {
            id: AccountId::new(id.to_hex()),
            username: new.username,
            email: new.email,
            role: new.role,
            created_at: from_bson_datetime(document.created_at)?,
        })
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<User>, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(None);
        };
        self.find_document(doc! { "_id": oid }).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_document(doc! { "username": username }).await
    }

    async fn find_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, StoreError> {
        match self
            .collection
            .find_one(doc! { "username": username })
            .await?
        {
            Some(document) => {
                let hash = document.password_hash.clone();
                Ok(Some((document.into_domain()?, hash)))
            }
            None => Ok(None),
        }
    }

    async fn count_admins(&self) -> Result<u64, StoreError> {
        Ok(self
            .collection
            .count_documents(doc! { "role": Role::Admin.as_str() })
            .await?)
    }

    async fn update(
        &self,
        id: &AccountId,
        patch: AccountPatch,
    ) -> Result<Option<User>, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(None);
        };

        if patch.is_empty() {
            return self.find_document(doc! { "_id": oid }).await;
        }

        let mut set = Document::new();
        if let Some(username) = &patch.username {
            set.insert("username", username.as_str());
        }
        if let Some(email) = &patch.email {
            set.insert("email", email.as_str());
        }
        if let Some(role) = patch.role {
            set.insert("role", role.as_str());
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_duplicate_key(e, "username already exists"))?;

        match updated {
            Some(document) => Ok(Some(document.into_domain()?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError> {
        let Some(oid) = parse_object_id(id.as_str()) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<User>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(to_limit(limit))
            .await?;

        let documents: Vec<UserDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(UserDocument::into_domain)
            .collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        ping_database(&self.db).await
    }
}

/// Parse an opaque ID string as an `ObjectId`. Malformed IDs cannot match
/// any stored document, so callers treat `None` as "not found".
pub(crate) fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Convert a BSON datetime to `chrono`.
pub(crate) fn from_bson_datetime(
    datetime: mongodb::bson::DateTime,
) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(datetime.timestamp_millis())
        .ok_or_else(|| StoreError::DataCorruption("timestamp out of range".to_owned()))
}

/// Clamp a `u64` page size to MongoDB's signed limit argument.
pub(crate) fn to_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Map a duplicate-key violation to [`StoreError::Conflict`], naming the
/// admin invariant when the partial role index rejected the write.
fn map_duplicate_key(err: mongodb::error::Error, username_message: &str) -> StoreError {
    if is_duplicate_key(&err) {
        let message = if err.to_string().contains(ADMIN_INDEX) {
            "an admin account already exists"
        } else {
            username_message
        };
        return StoreError::Conflict(message.to_owned());
    }
    StoreError::Database(err)
}
