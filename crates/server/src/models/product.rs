//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shoplite_core::{AccountId, ProductId};

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID, assigned by the store.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Account that created the product.
    pub added_by: AccountId,
    /// Whether an admin has approved the product for public listing.
    pub is_approved: bool,
    /// Whether the product is visible. Public listings show products that
    /// are approved and visible.
    pub visible: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// A product joined with its creator's username for listings.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub product: Product,
    /// Username of the creating account, if it still exists.
    pub added_by_username: Option<String>,
}

/// Data for creating a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub added_by: AccountId,
    /// New products start unapproved.
    pub is_approved: bool,
    /// New products start visible.
    pub visible: bool,
}

/// A partial update to a product.
///
/// Each field is independently omittable; `None` leaves the stored value
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_approved: Option<bool>,
    pub visible: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_approved.is_none()
            && self.visible.is_none()
    }
}
