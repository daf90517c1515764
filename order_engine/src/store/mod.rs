//! # Local order cache
//!
//! [`OrderStore`] defines what the engine needs from an order backend: append an order for a subject, and read a
//! subject's orders back in insertion order. Nothing is ever updated or removed.
//!
//! [`InMemoryOrderStore`] is the only backend. It lives for the lifetime of the process and loses everything on
//! restart. It also never evicts, so memory use grows with the number of orders placed.
mod memory;
mod traits;

pub use memory::InMemoryOrderStore;
pub use traits::{OrderStore, StoreError};
