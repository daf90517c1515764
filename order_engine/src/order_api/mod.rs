//! # Order engine public API
//!
//! * [`orders`] hosts [`OrderApi`](orders::OrderApi), the entry point for placing orders and reading order histories.
//! * [`merge`] reconciles local records with entries mirrored to the profile store.
//! * [`stats`] keeps counters for the background mirroring path, which never reports failures to callers.
//! * [`errors`] defines the error types returned to callers.
//!
//! # API usage
//!
//! ```rust,ignore
//! use order_engine::{InMemoryOrderStore, NoMirror, OrderApi};
//! let api = OrderApi::new(InMemoryOrderStore::default(), NoMirror, EventProducers::default());
//! let order = api.create_order(Some(&claims), &payload).await?;
//! let history = api.list_orders(Some(&claims)).await?;
//! ```
pub mod errors;
pub mod merge;
pub mod orders;
pub mod stats;
