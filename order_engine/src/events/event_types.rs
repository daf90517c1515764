use serde::{Deserialize, Serialize};

use crate::order_types::OrderRecord;

/// Emitted once for every order that has been accepted and stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub subject: String,
    pub order: OrderRecord,
}

impl OrderCreatedEvent {
    pub fn new<S: Into<String>>(subject: S, order: OrderRecord) -> Self {
        Self { subject: subject.into(), order }
    }
}
