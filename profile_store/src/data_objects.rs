use chrono::{DateTime, Duration, Utc};
use order_common::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProfileStoreError;

/// The response to a client-credentials exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceToken {
    pub access_token: Secret<String>,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the token in seconds.
    pub expires_in: i64,
}

/// A service token together with the moment it stops being usable.
#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub token: Secret<String>,
    pub expires_at: DateTime<Utc>,
}

/// Tokens are refreshed this long before they actually expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::seconds(60);

impl CachedToken {
    /// Fails if the token's lifetime is not positive, or too large to place on the calendar.
    pub fn new(token: ServiceToken, now: DateTime<Utc>) -> Result<Self, ProfileStoreError> {
        let lifetime = token.expires_in;
        let expires_at = Some(lifetime)
            .filter(|&s| s > 0)
            .and_then(Duration::try_seconds)
            .and_then(|d| now.checked_add_signed(d))
            .and_then(|t| t.checked_sub_signed(TOKEN_EXPIRY_MARGIN))
            .ok_or_else(|| ProfileStoreError::TokenExchange(format!("Unusable token lifetime: {lifetime}s")))?;
        Ok(Self { token: token.access_token, expires_at })
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// The subset of a user profile the order service cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl UserProfile {
    /// Extracts the raw `user_metadata.orders` array. A profile without the field has no mirrored orders. A field
    /// that is present but is not an array is an error, so that callers never overwrite data they don't understand.
    pub fn order_history(&self) -> Result<Vec<Value>, ProfileStoreError> {
        match &self.user_metadata["orders"] {
            Value::Null => Ok(Vec::new()),
            Value::Array(orders) => Ok(orders.clone()),
            other => Err(ProfileStoreError::JsonError(format!(
                "user_metadata.orders for {} is not an array: {other}",
                self.user_id
            ))),
        }
    }
}
