//! Normalization of mirrored order entries.
//!
//! Entries in the profile store were written by more than one producer over time. The canonical shape written by this
//! engine is the full [`OrderRecord`] (see [`canonical_entry`]), but older producers wrote `order_id` instead of `id`,
//! and some only wrote `{ order_id, created_at }`. Each field is therefore parsed on its own into a [`FieldValue`], and
//! the coalescing rules are applied explicitly:
//!
//! * `id` falls back to `order_id`. An entry with neither cannot be de-duplicated and is discarded.
//! * `created_at` must be an RFC 3339 timestamp. An entry without one cannot be placed in time and is discarded.
//! * `date` and `time` fall back to values derived from `created_at`.
//! * `items` that are missing or malformed become an empty list, which hides the entry from order histories.
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    mirror::MirrorError,
    order_types::{display_date, display_time, OrderId, OrderItem, OrderRecord},
};

/// The outcome of parsing one field of an untrusted JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<T> {
    Present(T),
    Absent,
    Invalid(String),
}

impl<T> FieldValue<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FieldValue<U> {
        match self {
            Self::Present(v) => FieldValue::Present(f(v)),
            Self::Absent => FieldValue::Absent,
            Self::Invalid(reason) => FieldValue::Invalid(reason),
        }
    }

    /// Uses `fallback` unless this value is present. If neither is present, an `Invalid` reason from this value is
    /// kept in preference to the fallback's.
    pub fn coalesce<F: FnOnce() -> Self>(self, fallback: F) -> Self {
        match self {
            Self::Present(v) => Self::Present(v),
            Self::Absent => fallback(),
            Self::Invalid(reason) => match fallback() {
                Self::Present(v) => Self::Present(v),
                _ => Self::Invalid(reason),
            },
        }
    }

    pub fn describe(&self, name: &str) -> String {
        match self {
            Self::Present(_) => format!("{name} is present"),
            Self::Absent => format!("{name} is missing"),
            Self::Invalid(reason) => format!("{name} is invalid: {reason}"),
        }
    }
}

fn string_field(entry: &Value, key: &str) -> FieldValue<String> {
    match entry.get(key) {
        None | Some(Value::Null) => FieldValue::Absent,
        Some(Value::String(s)) if s.trim().is_empty() => FieldValue::Invalid(format!("{key} is empty")),
        Some(Value::String(s)) => FieldValue::Present(s.clone()),
        Some(other) => FieldValue::Invalid(format!("{key} is not a string: {other}")),
    }
}

fn timestamp_field(entry: &Value, key: &str) -> FieldValue<DateTime<Utc>> {
    match string_field(entry, key) {
        FieldValue::Present(s) => match s.parse::<DateTime<Utc>>() {
            Ok(t) => FieldValue::Present(t),
            Err(e) => FieldValue::Invalid(format!("{key} ({s}) is not a timestamp. {e}")),
        },
        FieldValue::Absent => FieldValue::Absent,
        FieldValue::Invalid(reason) => FieldValue::Invalid(reason),
    }
}

fn items_field(entry: &Value, key: &str) -> FieldValue<Vec<OrderItem>> {
    match entry.get(key) {
        None | Some(Value::Null) => FieldValue::Absent,
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value::<OrderItem>(item.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Present)
            .unwrap_or_else(|e| FieldValue::Invalid(format!("{key} contains a malformed item. {e}"))),
        Some(other) => FieldValue::Invalid(format!("{key} is not a list: {other}")),
    }
}

/// A mirrored order entry, parsed field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredOrderEntry {
    pub id: FieldValue<OrderId>,
    pub created_at: FieldValue<DateTime<Utc>>,
    pub date: FieldValue<String>,
    pub time: FieldValue<String>,
    pub items: FieldValue<Vec<OrderItem>>,
}

impl MirroredOrderEntry {
    pub fn parse(entry: &Value) -> Self {
        if !entry.is_object() {
            let reason = format!("entry is not an object: {entry}");
            return Self {
                id: FieldValue::Invalid(reason.clone()),
                created_at: FieldValue::Invalid(reason.clone()),
                date: FieldValue::Invalid(reason.clone()),
                time: FieldValue::Invalid(reason.clone()),
                items: FieldValue::Invalid(reason),
            };
        }
        Self {
            id: string_field(entry, "id").coalesce(|| string_field(entry, "order_id")).map(OrderId),
            created_at: timestamp_field(entry, "created_at"),
            date: string_field(entry, "date"),
            time: string_field(entry, "time"),
            items: items_field(entry, "items"),
        }
    }

    /// Converts the entry into an order record, applying the coalescing rules described in the module docs. Entries
    /// that have no usable id or timestamp are rejected with the reason.
    pub fn into_record(self) -> Result<OrderRecord, String> {
        let id = match self.id {
            FieldValue::Present(id) => id,
            other => return Err(other.describe("id")),
        };
        let created_at = match self.created_at {
            FieldValue::Present(t) => t,
            other => return Err(format!("Order {id}: {}", other.describe("created_at"))),
        };
        Ok(OrderRecord {
            id,
            created_at,
            date: self.date.present().unwrap_or_else(|| display_date(&created_at)),
            time: self.time.present().unwrap_or_else(|| display_time(&created_at)),
            items: self.items.present().unwrap_or_default(),
        })
    }
}

/// The JSON written to the profile store for an order: the full record, keyed by `id`.
pub fn canonical_entry(order: &OrderRecord) -> Result<Value, MirrorError> {
    serde_json::to_value(order).map_err(|e| MirrorError::Malformed(e.to_string()))
}
