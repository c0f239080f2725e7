//! Pineapple POS Core - Shared types library.
//!
//! This crate provides common types used across all Pineapple POS components:
//! - `engine` - Cart computation engine and product catalog query layer
//! - `cli` - Command-line tools for catalog browsing and cart quoting
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, badges, variants, categories and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
