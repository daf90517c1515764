//! # Mirroring to the profile store
//!
//! Orders are mirrored to a remote, per-user profile store so that a user's history survives a restart of the server.
//! The profile store offers no partial updates: appending an order means reading the full list, adding to it, and
//! writing the whole list back. Concurrent appends for the same user can therefore lose updates.
//!
//! Every failure here is recoverable. Callers log it and carry on with local data.
mod normalize;

use serde_json::Value;

pub use crate::order_api::errors::MirrorError;
use crate::order_types::OrderRecord;
pub use normalize::{canonical_entry, FieldValue, MirroredOrderEntry};

/// The `OrderMirror` trait is the engine's view of the remote profile store.
#[allow(async_fn_in_trait)]
pub trait OrderMirror {
    /// Appends `order` to the subject's mirrored list, using the canonical entry shape (see [`canonical_entry`]).
    async fn append_mirrored_order(&self, subject: &str, order: &OrderRecord) -> Result<(), MirrorError>;

    /// Fetches the subject's mirrored entries as raw JSON. Entries are untrusted and must be normalized before use.
    async fn fetch_mirrored_orders(&self, subject: &str) -> Result<Vec<Value>, MirrorError>;
}

/// A mirror for deployments without a profile store. Appends succeed without doing anything, and every subject has an
/// empty mirrored history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMirror;

impl OrderMirror for NoMirror {
    async fn append_mirrored_order(&self, _subject: &str, _order: &OrderRecord) -> Result<(), MirrorError> {
        Ok(())
    }

    async fn fetch_mirrored_orders(&self, _subject: &str) -> Result<Vec<Value>, MirrorError> {
        Ok(Vec::new())
    }
}
