//! Shoplite Core - Shared domain types.
//!
//! This crate provides common types used by the Shoplite API server:
//! type-safe IDs, validated usernames and email addresses, account roles,
//! and the offset-pagination helper shared by the user and product listings.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
