//! Domain types for accounts and products.

pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductListing, ProductPatch};
pub use user::{AccountPatch, NewAccount, User};
