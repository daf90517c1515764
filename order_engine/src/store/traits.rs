use thiserror::Error;

use crate::order_types::OrderRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("The order store lock was poisoned. {0}")]
    LockPoisoned(String),
    #[error("Order store backend error. {0}")]
    Backend(String),
}

/// The `OrderStore` trait defines the behaviour of the local order cache.
///
/// Orders are grouped by subject and kept in the order they were appended. Implementations must be cheap to clone and
/// share their state between clones, since the server hands one clone to each worker.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Appends `order` to the end of the subject's list, creating the list if this is the subject's first order.
    async fn append_order(&self, subject: &str, order: OrderRecord) -> Result<(), StoreError>;

    /// Fetches all the subject's orders in insertion order. A subject with no orders gets an empty list.
    async fn fetch_orders(&self, subject: &str) -> Result<Vec<OrderRecord>, StoreError>;
}
