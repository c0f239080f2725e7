//! Cart line items and their composite identity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pineapple_pos_core::{Badge, ProductId, VariantSelection};

/// Identity of a cart line.
///
/// Two additions land on the same line only if the product, the chosen
/// variant and the note all match. Keying on the product alone would merge
/// differently customized lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: VariantSelection,
    #[serde(default)]
    pub note: String,
}

impl LineKey {
    /// Build a key, normalizing surrounding whitespace in the note.
    #[must_use]
    pub fn new(product_id: ProductId, variant: VariantSelection, note: &str) -> Self {
        Self {
            product_id,
            variant,
            note: note.trim().to_owned(),
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.product_id, self.variant)?;
        if !self.note.is_empty() {
            write!(f, " \"{}\"", self.note)?;
        }
        Ok(())
    }
}

/// One distinguishable entry in the basket.
///
/// `unit_price` and `badge` are captured when the line is created and are not
/// re-read from the catalog while the line exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub(crate) key: LineKey,
    pub(crate) name: String,
    pub(crate) unit_price: Decimal,
    pub(crate) quantity: u32,
    #[serde(default)]
    pub(crate) badge: Option<Badge>,
    pub(crate) added_at: DateTime<Utc>,
}

impl CartLine {
    #[must_use]
    pub const fn key(&self) -> &LineKey {
        &self.key
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.key.product_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn note(&self) -> &str {
        &self.key.note
    }

    #[must_use]
    pub const fn selected_variant(&self) -> &VariantSelection {
        &self.key.variant
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub const fn badge(&self) -> Option<Badge> {
        self.badge
    }

    #[must_use]
    pub const fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Unit price times quantity, before discount. Saturates at `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_whitespace_is_normalized() {
        let a = LineKey::new(ProductId::new("p1"), VariantSelection::default(), "no ice ");
        let b = LineKey::new(ProductId::new("p1"), VariantSelection::default(), " no ice");
        assert_eq!(a, b);
    }

    #[test]
    fn test_keys_differ_by_note_and_variant() {
        let plain = LineKey::new(ProductId::new("p1"), VariantSelection::default(), "");
        let noted = LineKey::new(ProductId::new("p1"), VariantSelection::default(), "extra hot");
        let large = LineKey::new(
            ProductId::new("p1"),
            VariantSelection {
                size: Some("L".to_string()),
                ..VariantSelection::default()
            },
            "",
        );
        assert_ne!(plain, noted);
        assert_ne!(plain, large);
    }

    #[test]
    fn test_display() {
        let key = LineKey::new(ProductId::new("p1"), VariantSelection::default(), "to go");
        assert_eq!(key.to_string(), "p1[default] \"to go\"");
    }
}
