//! Order Engine
//!
//! The order engine holds the core logic of the pizza order service. It is transport-agnostic: the HTTP server
//! decodes bearer tokens into [`OrderClaims`] and hands them, together with the request payload, to [`OrderApi`].
//!
//! The library is divided into the following sections:
//! 1. Order data types ([`mod@order_types`]) and claim checks ([`mod@claims`]).
//! 2. The local order cache ([`mod@store`]). [`OrderStore`] defines the backend contract, and [`InMemoryOrderStore`]
//!    is the process-lifetime implementation used by the server.
//! 3. Mirroring ([`mod@mirror`]). [`OrderMirror`] is the seam to the remote profile store. Entries read back from the
//!    profile store are untrusted and are normalized before they are merged with local records.
//! 4. The public API ([`OrderApi`]), which validates requests, stores new orders, and merges order histories.
//!
//! New orders are mirrored in the background. The engine emits an `OrderCreatedEvent` for every accepted order, and
//! a hook registered with [`events::EventHooks`] performs the actual mirroring, off the request path.
pub mod claims;
pub mod events;
pub mod mirror;
mod order_api;
pub mod order_types;
pub mod store;

pub use mirror::{MirrorError, NoMirror, OrderMirror};
pub use order_api::{
    errors::{ForbiddenReason, OrderError},
    merge::merge_order_history,
    orders::OrderApi,
    stats::{MirrorStats, MirrorStatsSnapshot},
};
pub use claims::OrderClaims;
pub use store::{InMemoryOrderStore, OrderStore, StoreError};
