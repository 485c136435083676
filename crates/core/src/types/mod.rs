//! Core types for Shoplite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod role;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{Page, PageError, PageRequest};
pub use role::Role;
pub use username::{Username, UsernameError};
