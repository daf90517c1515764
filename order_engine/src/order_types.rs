use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::order_api::errors::OrderError;

//--------------------------------------       OrderId         ---------------------------------------------------------
/// Opaque, globally unique order identifier. This is the only key used to de-duplicate local and mirrored copies of
/// an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh random (v4) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for OrderId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
}

impl OrderItem {
    pub fn new<S: Into<String>>(name: S, quantity: i64) -> Self {
        Self { name: name.into(), quantity }
    }
}

/// An item list is displayable if it is non-empty and every line has a positive quantity.
pub fn is_displayable(items: &[OrderItem]) -> bool {
    !items.is_empty() && items.iter().all(|i| i.quantity > 0)
}

/// Extracts the order lines from a create-order payload.
///
/// The payload must carry an `items` array, and every element must look like `{ "name": ..., "quantity": ... }`.
/// An empty array is accepted here. Empty orders are hidden when order histories are read.
pub fn parse_order_items(payload: &Value) -> Result<Vec<OrderItem>, OrderError> {
    match payload.get("items") {
        None | Some(Value::Null) => Err(OrderError::BadRequest("The order has no items field".into())),
        Some(items @ Value::Array(_)) => serde_json::from_value::<Vec<OrderItem>>(items.clone())
            .map_err(|e| OrderError::BadRequest(format!("The order items are malformed. {e}"))),
        Some(_) => Err(OrderError::BadRequest("The order items field must be a list".into())),
    }
}

//--------------------------------------      OrderRecord      ---------------------------------------------------------
/// One placed order, exactly as it is stored locally and mirrored to the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    /// Human-readable date, derived from `created_at`. Never used for ordering.
    pub date: String,
    /// Human-readable time of day, derived from `created_at`. Never used for ordering.
    pub time: String,
    pub items: Vec<OrderItem>,
}

impl OrderRecord {
    /// Creates a brand-new order with a fresh id, placed at `created_at`.
    pub fn new(items: Vec<OrderItem>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::random(),
            created_at,
            date: display_date(&created_at),
            time: display_time(&created_at),
            items,
        }
    }

    pub fn with_id<I: Into<OrderId>>(mut self, id: I) -> Self {
        self.id = id.into();
        self
    }

    /// The number of pizzas in the order. Saturates rather than overflowing on absurd quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().fold(0i64, |total, i| total.saturating_add(i.quantity))
    }
}

/// `M/D/YYYY`, e.g. `3/7/2024`
pub fn display_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

/// `h:mm:ss AM`, e.g. `6:05:09 PM`
pub fn display_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%-I:%M:%S %p").to_string()
}

//--------------------------------------     DisplayOrder      ---------------------------------------------------------
/// An order as it is returned from an order history query. `order_number` is assigned at read time: the oldest
/// displayed order is number 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOrder {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub order_number: usize,
}

//--------------------------------------      Permission       ---------------------------------------------------------
/// The capabilities (API scopes) the order service checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "create:orders")]
    CreateOrders,
    #[serde(rename = "read:orders")]
    ReadOrders,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrders => "create:orders",
            Self::ReadOrders => "read:orders",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown permission: {0}")]
pub struct PermissionParseError(String);

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create:orders" => Ok(Self::CreateOrders),
            "read:orders" => Ok(Self::ReadOrders),
            s => Err(PermissionParseError(s.to_string())),
        }
    }
}
