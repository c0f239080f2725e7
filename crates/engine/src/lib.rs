//! Pineapple POS Engine.
//!
//! The in-memory order/cart engine and product catalog query layer behind the
//! point-of-sale front end.
//!
//! # Components
//!
//! - [`catalog`] - `CatalogStore`, an in-memory category/search facade for small catalogs
//! - [`query`] - `ProductQueryService`, paginated/sorted/filtered queries over a `ProductSource`
//! - [`variant`] - `VariantResolver`, direct-add vs. customization decision
//! - [`cart`] - `CartEngine`, line items, merge policy and totals
//!
//! Supporting seams: [`notify`] (event bus injected into the engine and query
//! service), [`device`] (printer/scanner/cloud providers), [`db`] (`PostgreSQL`
//! product source) and [`config`].
//!
//! # Concurrency
//!
//! Cart mutations are synchronous and never suspend. Catalog queries are the
//! only async operations; stale responses are discarded using request
//! sequence tokens rather than cancellation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod notify;
pub mod query;
pub mod variant;

pub use cart::{CartEngine, CartLine, CartSnapshot, CartTotals, LineKey, QuantityChange, TaxPolicy};
pub use catalog::CatalogStore;
pub use config::{CatalogMode, ConfigError, EngineConfig};
pub use device::{Device, DeviceKind, DeviceProvider, DeviceSource, LiveDevices, MockDevices};
pub use error::{EngineError, QueryError};
pub use notify::{BroadcastNotifier, EngineEvent, NoopNotifier, Notifier, TracingNotifier};
pub use query::{
    InMemoryProductSource, PageAccumulator, ProductQueryService, ProductSource, QueryPage,
    QueryParams, RequestSequencer, SequenceToken, SortBy, SortOrder,
};
pub use variant::{Customization, Resolution, ResolverState, VariantResolver};
