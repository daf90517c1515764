use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use serde_json::Value;

use crate::{
    claims::{authorize_create, authorize_read, OrderClaims},
    events::{EventProducers, OrderCreatedEvent},
    merge_order_history,
    mirror::OrderMirror,
    order_api::{errors::OrderError, stats::MirrorStats},
    order_types::{parse_order_items, DisplayOrder, OrderRecord},
    store::OrderStore,
};

/// `OrderApi` is the entry point for placing orders and reading order histories.
///
/// New orders are written to the local store synchronously and mirrored in the background: the API publishes an
/// [`OrderCreatedEvent`] and returns without waiting for the profile store. Reads merge the local records with
/// whatever the profile store holds, and fall back to local records alone if it cannot be reached.
pub struct OrderApi<S, M> {
    store: S,
    mirror: M,
    producers: EventProducers,
    stats: MirrorStats,
}

impl<S, M> Debug for OrderApi<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.stats.snapshot())
    }
}

impl<S, M> OrderApi<S, M>
where
    S: OrderStore,
    M: OrderMirror,
{
    pub fn new(store: S, mirror: M, producers: EventProducers) -> Self {
        Self { store, mirror, producers, stats: MirrorStats::default() }
    }

    /// Shares `stats` with this API instance, typically so that the background mirroring hook and the API count into
    /// the same place.
    pub fn with_stats(mut self, stats: MirrorStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn mirror_stats(&self) -> &MirrorStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new order for the token's subject. See [`Self::create_order_at`].
    pub async fn create_order(&self, claims: Option<&OrderClaims>, payload: &Value) -> Result<OrderRecord, OrderError> {
        self.create_order_at(claims, payload, Utc::now()).await
    }

    /// Places a new order at time `now`.
    ///
    /// The checks run in this order, and nothing is stored unless they all pass:
    /// 1. the token is present, names a subject and has not expired,
    /// 2. it grants `create:orders`,
    /// 3. the user's email address is verified,
    /// 4. the payload carries a well-formed `items` list.
    ///
    /// Once the order is stored it is queued for mirroring. Mirroring problems are logged and counted, never returned.
    pub async fn create_order_at(
        &self,
        claims: Option<&OrderClaims>,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<OrderRecord, OrderError> {
        let subject = authorize_create(claims, now)?;
        let items = parse_order_items(payload)?;
        let order = OrderRecord::new(items, now);
        self.store.append_order(subject, order.clone()).await.map_err(|e| {
            error!("🍕️ Could not store order {} for {subject}. {e}", order.id);
            OrderError::Internal(e.to_string())
        })?;
        info!("🍕️ New order {} for {subject} with {} pizzas", order.id, order.total_quantity());
        self.queue_mirroring(subject, &order);
        Ok(order)
    }

    fn queue_mirroring(&self, subject: &str, order: &OrderRecord) {
        for producer in &self.producers.order_created_producer {
            let event = OrderCreatedEvent::new(subject, order.clone());
            match producer.try_publish_event(event) {
                Ok(()) => {
                    trace!("🍕️ Order {} queued for mirroring", order.id);
                    self.stats.record_submitted();
                },
                Err(e) => {
                    warn!("🍕️ Order {} for {subject} will not be mirrored. {e}", order.id);
                    self.stats.record_dropped();
                },
            }
        }
    }

    /// Fetches the token subject's order history. See [`Self::list_orders_at`].
    pub async fn list_orders(&self, claims: Option<&OrderClaims>) -> Result<Vec<DisplayOrder>, OrderError> {
        self.list_orders_at(claims, Utc::now()).await
    }

    /// Fetches the order history as of `now`: local records merged with the mirrored entries, newest first and
    /// numbered. If the profile store cannot be read, the local records are returned on their own.
    pub async fn list_orders_at(
        &self,
        claims: Option<&OrderClaims>,
        now: DateTime<Utc>,
    ) -> Result<Vec<DisplayOrder>, OrderError> {
        let subject = authorize_read(claims, now)?;
        let local = self.store.fetch_orders(subject).await.map_err(|e| {
            error!("🍕️ Could not read the stored orders for {subject}. {e}");
            OrderError::Internal(e.to_string())
        })?;
        let mirrored = match self.mirror.fetch_mirrored_orders(subject).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("🍕️ Could not fetch mirrored orders for {subject}. Showing local orders only. {e}");
                self.stats.record_fetch_failed();
                Vec::new()
            },
        };
        debug!("🍕️ {subject} has {} local and {} mirrored orders", local.len(), mirrored.len());
        Ok(merge_order_history(local, &mirrored))
    }
}
