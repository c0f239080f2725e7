//! Persisted cart state.
//!
//! The front end stores the active cart between sessions as JSON. A snapshot
//! that cannot be parsed or that violates a line invariant is discarded and
//! the terminal starts with an empty cart rather than failing.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use pineapple_pos_core::MAX_PRICE;

use super::engine::CartEngine;
use super::line::CartLine;
use super::totals::TaxPolicy;
use crate::notify::Notifier;

/// Errors that can occur when restoring a stored cart.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unparseable cart snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid cart line {line}: {reason}")]
    InvalidLine { line: String, reason: &'static str },
}

/// Serializable copy of a cart's lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and validate a stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Parse` for malformed JSON and
    /// `SnapshotError::InvalidLine` for a zero quantity, a negative or
    /// oversized price, or a duplicated line key.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            let reason = if line.quantity < 1 {
                Some("quantity below one")
            } else if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
                Some("negative unit price")
            } else if line.unit_price > MAX_PRICE {
                Some("unit price above maximum")
            } else if !seen.insert(&line.key) {
                Some("duplicate line key")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(SnapshotError::InvalidLine {
                    line: line.key.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

impl CartEngine {
    /// Capture the current lines for persistence.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart_id: self.id(),
            saved_at: Utc::now(),
            lines: self.lines().to_vec(),
        }
    }

    /// Rebuild a cart from a validated snapshot. Totals are re-derived.
    #[must_use]
    pub fn from_snapshot(
        snapshot: CartSnapshot,
        tax: TaxPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_lines(snapshot.cart_id, snapshot.lines, tax, notifier)
    }

    /// Restore a stored cart, falling back to an empty cart if the stored
    /// state is corrupt.
    #[must_use]
    pub fn restore_or_default(json: &str, tax: TaxPolicy, notifier: Arc<dyn Notifier>) -> Self {
        match CartSnapshot::from_json(json) {
            Ok(snapshot) => {
                tracing::debug!(
                    cart_id = %snapshot.cart_id,
                    lines = snapshot.lines.len(),
                    "Restored cart"
                );
                Self::from_snapshot(snapshot, tax, notifier)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding stored cart");
                Self::new(tax, notifier)
            }
        }
    }
}
