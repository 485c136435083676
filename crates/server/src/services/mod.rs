//! Business logic services.
//!
//! - [`auth`] - signup and login (password hashing, token issuance)
//! - [`users`] - admin account management with the single-admin invariant
//! - [`catalog`] - product workflow (approval, visibility, pagination)
//! - [`token`] - stateless bearer-token signing and verification

pub mod auth;
pub mod catalog;
pub mod token;
pub mod users;

pub use auth::{AuthError, AuthService, SignupRequest};
pub use catalog::{CatalogError, CatalogService, NewProductRequest, UpdateProductRequest};
pub use token::{Claims, TokenError, TokenService};
pub use users::{UpdateAccountRequest, UserError, UserService};
