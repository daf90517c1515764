use serde::{Deserialize, Serialize};
use serde_json::Value;

use order_engine::order_types::{DisplayOrder, OrderRecord};

use crate::config::AuthConfig;

/// The body of a create-order request. The order itself is validated by the order engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(default)]
    pub order: Value,
}

impl NewOrderRequest {
    /// Reads the request body leniently. Bodies that are not JSON, or have no `order` field, yield an empty order,
    /// which the engine rejects once the caller's token has been checked.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            log::debug!("💻️ Order request body is not valid JSON. {e}");
            Self::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub order: OrderRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistoryResponse {
    pub success: bool,
    pub orders: Vec<DisplayOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self { success: false, error: error.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalApiResponse {
    pub msg: String,
}

/// The identity provider settings the single-page app needs to start a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
}

impl From<&AuthConfig> for SpaConfig {
    fn from(config: &AuthConfig) -> Self {
        Self { domain: config.domain.clone(), client_id: config.client_id.clone(), audience: config.audience.clone() }
    }
}
