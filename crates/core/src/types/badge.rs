//! Promotional badges attached to catalog products.

use serde::{Deserialize, Serialize};

/// A promotional or status tag on a product.
///
/// Badges drive both display styling and, for some variants, the per-line
/// discount applied in the cart. A product without a badge carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    /// Featured item, no price effect.
    Special,
    /// Limited-time item.
    Limited,
    /// Stock is running low.
    LowStock,
    /// Percentage discount applies to the line.
    PercentOff,
    /// Redeemable with a loyalty reward.
    NeedsReward,
}

impl Badge {
    /// All badge values, in display order.
    pub const ALL: [Self; 5] = [
        Self::Special,
        Self::Limited,
        Self::LowStock,
        Self::PercentOff,
        Self::NeedsReward,
    ];

    /// The persisted/wire representation of this badge.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Special => "special",
            Self::Limited => "limited",
            Self::LowStock => "low-stock",
            Self::PercentOff => "percent-off",
            Self::NeedsReward => "needs-reward",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Badge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|badge| badge.as_str() == s)
            .ok_or_else(|| format!("invalid badge: {s}"))
    }
}
