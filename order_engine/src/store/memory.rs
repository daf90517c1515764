use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use log::*;

use crate::{
    order_types::OrderRecord,
    store::{OrderStore, StoreError},
};

/// A process-lifetime order store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Vec<OrderRecord>>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of subjects that have placed at least one order.
    pub fn subject_count(&self) -> Result<usize, StoreError> {
        let orders = self.orders.read().map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(orders.len())
    }
}

impl OrderStore for InMemoryOrderStore {
    async fn append_order(&self, subject: &str, order: OrderRecord) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let list = orders.entry(subject.to_string()).or_default();
        trace!("🗃️ Appending order {} for {subject}. {} orders already stored.", order.id, list.len());
        list.push(order);
        Ok(())
    }

    async fn fetch_orders(&self, subject: &str) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = self.orders.read().map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(orders.get(subject).cloned().unwrap_or_default())
    }
}
