use std::collections::HashSet;

use log::*;
use serde_json::Value;

use crate::{
    mirror::MirroredOrderEntry,
    order_types::{is_displayable, DisplayOrder, OrderRecord},
};

/// Reconciles a subject's local orders with the entries mirrored to the profile store.
///
/// 1. Mirrored entries are normalized. Entries without an id or timestamp are dropped.
/// 2. Local records come first, so when both sources hold the same `id`, the local copy wins.
/// 3. The union is sorted newest first. The sort is stable, so equal timestamps keep their input order.
/// 4. Orders without displayable items are removed.
/// 5. The survivors are numbered from the oldest (1) to the newest (N).
///
/// Numbering happens after filtering, so hidden orders never take up a number.
pub fn merge_order_history(local: Vec<OrderRecord>, mirrored: &[Value]) -> Vec<DisplayOrder> {
    let normalized = mirrored.iter().filter_map(|entry| match MirroredOrderEntry::parse(entry).into_record() {
        Ok(record) => Some(record),
        Err(reason) => {
            warn!("🪞️ Ignoring mirrored order entry. {reason}");
            None
        },
    });
    let mut seen = HashSet::new();
    let mut merged = local.into_iter().chain(normalized).filter(|o| seen.insert(o.id.clone())).collect::<Vec<_>>();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let visible = merged.into_iter().filter(|o| is_displayable(&o.items)).collect::<Vec<_>>();
    let total = visible.len();
    visible.into_iter().enumerate().map(|(i, order)| DisplayOrder { order, order_number: total - i }).collect()
}
