//! Notification surface for user-visible outcomes.
//!
//! The engine never talks to the UI directly. A [`Notifier`] is injected into
//! `CartEngine` and `ProductQueryService` at construction time, and the front
//! end decides how (or whether) to surface each [`EngineEvent`].

use serde::Serialize;
use tokio::sync::broadcast;

use pineapple_pos_core::ProductId;

use crate::cart::LineKey;

/// Default capacity of the broadcast event bus.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Something happened that the operator may want to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A product was added, either as a new line or merged into an existing one.
    ItemAdded {
        product_id: ProductId,
        name: String,
        quantity: u32,
        merged: bool,
    },
    /// A line's quantity was set through the stepper.
    QuantityChanged { line: LineKey, quantity: u32 },
    /// A line left the cart.
    ItemRemoved { line: LineKey },
    /// The cart was emptied.
    CartCleared,
    /// A catalog query failed; `message` is safe to display.
    QueryFailed { message: String, retryable: bool },
}

/// Receives engine events.
pub trait Notifier: Send + Sync {
    /// Deliver an event. Must not block.
    fn notify(&self, event: &EngineEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &EngineEvent) {}
}

/// Writes every event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &EngineEvent) {
        match event {
            EngineEvent::QueryFailed { message, retryable } => {
                tracing::warn!(%message, retryable, "Catalog query failed");
            }
            other => tracing::info!(event = ?other, "Engine event"),
        }
    }
}

/// Fans events out to any number of subscribers over a tokio broadcast channel.
///
/// Subscribers that fall behind lose the oldest events; the sender never waits.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<EngineEvent>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl BroadcastNotifier {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: &EngineEvent) {
        // No receivers is not an error for a fire-and-forget bus
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}
