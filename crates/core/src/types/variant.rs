//! Product variant dimensions and the operator's selection among them.

use serde::{Deserialize, Serialize};

/// The selectable options a product offers, per variant dimension.
///
/// Each dimension may be missing from persisted data or present but empty;
/// both mean "nothing to choose".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOptions {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub flavors: Vec<String>,
}

impl VariantOptions {
    /// Returns `true` if no dimension offers any option.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.sizes.is_empty() && self.flavors.is_empty()
    }

    /// Returns `true` if `selection` is complete and offered: every dimension
    /// with options has one of them chosen, and no other dimension is chosen.
    #[must_use]
    pub fn admits(&self, selection: &VariantSelection) -> bool {
        fn admits_dimension(options: &[String], chosen: Option<&String>) -> bool {
            match chosen {
                Some(value) => options.contains(value),
                None => options.is_empty(),
            }
        }

        admits_dimension(&self.colors, selection.color.as_ref())
            && admits_dimension(&self.sizes, selection.size.as_ref())
            && admits_dimension(&self.flavors, selection.flavor.as_ref())
    }

    /// The first offered option of every dimension.
    #[must_use]
    pub fn default_selection(&self) -> VariantSelection {
        VariantSelection {
            color: self.colors.first().cloned(),
            size: self.sizes.first().cloned(),
            flavor: self.flavors.first().cloned(),
        }
    }
}

/// A chosen color/size/flavor combination for one cart line.
///
/// Two selections are the same variant only when every dimension matches,
/// so the derived `Eq`/`Hash` double as the variant signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
}

impl VariantSelection {
    /// Returns `true` if nothing was chosen.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none() && self.flavor.is_none()
    }
}

impl std::fmt::Display for VariantSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [&self.color, &self.size, &self.flavor]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect();
        if parts.is_empty() {
            f.write_str("default")
        } else {
            f.write_str(&parts.join(" / "))
        }
    }
}
