//! Mirroring orders into user profiles
//!
//! [`ProfileStoreMirror`] adapts the Management API client to the order engine's [`OrderMirror`] seam, and
//! [`create_profile_store_event_handlers`] registers the background hook that mirrors every new order.
use futures::future::BoxFuture;
use log::*;
use order_engine::{
    events::{EventHandlers, EventHooks, OrderCreatedEvent},
    mirror::canonical_entry,
    order_types::OrderRecord,
    MirrorError,
    MirrorStats,
    OrderMirror,
};
use profile_store::{ProfileStoreApi, ProfileStoreError};
use serde_json::Value;

#[derive(Clone)]
pub struct ProfileStoreMirror {
    api: ProfileStoreApi,
}

impl ProfileStoreMirror {
    pub fn new(api: ProfileStoreApi) -> Self {
        Self { api }
    }

    /// Reads the subject's mirrored orders, appends `order` and writes the whole list back. The Management API has no
    /// append operation, so two concurrent appends for the same subject can lose one of the orders.
    pub async fn append(&self, subject: &str, order: &OrderRecord) -> Result<(), MirrorError> {
        let entry = canonical_entry(order)?;
        let mut orders =
            self.api.fetch_order_history(subject).await.map_err(|e| to_mirror_error(e, MirrorError::Fetch))?;
        orders.push(entry);
        self.api.replace_order_history(subject, orders).await.map_err(|e| to_mirror_error(e, MirrorError::Update))?;
        Ok(())
    }

    pub async fn fetch(&self, subject: &str) -> Result<Vec<Value>, MirrorError> {
        self.api.fetch_order_history(subject).await.map_err(|e| to_mirror_error(e, MirrorError::Fetch))
    }
}

fn to_mirror_error(e: ProfileStoreError, otherwise: fn(String) -> MirrorError) -> MirrorError {
    match e {
        ProfileStoreError::TokenExchange(s) => MirrorError::ServiceCredential(s),
        ProfileStoreError::JsonError(s) => MirrorError::Malformed(s),
        e => otherwise(e.to_string()),
    }
}

impl OrderMirror for ProfileStoreMirror {
    async fn append_mirrored_order(&self, subject: &str, order: &OrderRecord) -> Result<(), MirrorError> {
        self.append(subject, order).await
    }

    async fn fetch_mirrored_orders(&self, subject: &str) -> Result<Vec<Value>, MirrorError> {
        self.fetch(subject).await
    }
}

/// Assigns the mirroring hook.
///
/// 1. OrderCreatedEvent - Every order that has been stored locally is appended to the `orders` list in the user's
///    profile. Failures are logged and counted in `stats`, and the order is not retried. It remains available from the
///    local store for as long as the server runs.
pub fn create_profile_store_event_handlers(
    mirror: ProfileStoreMirror,
    stats: MirrorStats,
    buffer_size: usize,
) -> EventHandlers {
    let mut hooks = EventHooks::default();
    // --- On OrderCreated Handler ---
    hooks.on_order_created(move |ev| -> BoxFuture<'static, ()> {
        let OrderCreatedEvent { subject, order } = ev;
        if subject.is_empty() {
            error!("🪞️ Order {} has no subject and cannot be mirrored", order.id);
            stats.record_failed();
            return no_op();
        }
        let mirror = mirror.clone();
        let stats = stats.clone();
        Box::pin(async move {
            match mirror.append(&subject, &order).await {
                Ok(()) => {
                    info!("🪞️ Order {} mirrored to the profile of {subject}", order.id);
                    stats.record_mirrored();
                },
                Err(e) => {
                    error!("🪞️ Error mirroring order {} for {subject}. {e}", order.id);
                    stats.record_failed();
                },
            }
        })
    });
    EventHandlers::new(buffer_size, hooks)
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}
