//! Core types for Pineapple POS.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod badge;
pub mod category;
pub mod id;
pub mod price;
pub mod product;
pub mod variant;

pub use badge::Badge;
pub use category::{ALL_CATEGORIES, Category, CategoryFacet};
pub use id::*;
pub use price::{MAX_PRICE, round_money};
pub use product::{Product, ProductError};
pub use variant::{VariantOptions, VariantSelection};
