//! Catalog product type.
//!
//! Products are owned by persisted storage and are read-only to the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::badge::Badge;
use super::id::{CategoryId, ProductId};
use super::price::MAX_PRICE;
use super::variant::VariantOptions;

/// Errors describing a malformed catalog row.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product has no identifier.
    #[error("product id is missing")]
    MissingId,
    /// The product has no display name.
    #[error("product {0} has no name")]
    MissingName(ProductId),
    /// The price is negative or above [`MAX_PRICE`].
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// A product as read from the catalog.
///
/// Optional columns (brand, barcode, reorder threshold) default to empty when
/// the persisted row does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: CategoryId,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub reorder_threshold: Option<i32>,
    #[serde(default)]
    pub badge: Option<Badge>,
    #[serde(default)]
    pub variants: Option<VariantOptions>,
}

impl Product {
    /// Create a product with the required fields and no optional data.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<CategoryId>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            image: None,
            description: String::new(),
            brand: None,
            barcode: None,
            reorder_threshold: None,
            badge: None,
            variants: None,
        }
    }

    /// Set the badge.
    #[must_use]
    pub const fn with_badge(mut self, badge: Badge) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Set the brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the variant options.
    #[must_use]
    pub fn with_variants(mut self, variants: VariantOptions) -> Self {
        self.variants = Some(variants);
        self
    }

    /// Check that the product can be priced into a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or name is blank, or the price is negative
    /// or above [`MAX_PRICE`].
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.id.is_blank() {
            return Err(ProductError::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(ProductError::MissingName(self.id.clone()));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ProductError::InvalidPrice(format!("{} is negative", self.price)));
        }
        if self.price > MAX_PRICE {
            return Err(ProductError::InvalidPrice(format!(
                "{} exceeds {MAX_PRICE}",
                self.price
            )));
        }
        Ok(())
    }

    /// Returns `true` if at least one variant dimension has options.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        self.variants.as_ref().is_some_and(|v| !v.is_empty())
    }
}
