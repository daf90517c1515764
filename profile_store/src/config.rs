use std::time::Duration;

use log::*;
use order_common::{parse_env_or_default, Secret};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ProfileStoreConfig {
    /// The identity provider tenant domain, e.g. "pizza42.us.auth0.com"
    pub domain: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// The audience requested in the client-credentials exchange. Usually `https://{domain}/api/v2/`.
    pub audience: String,
    pub timeout: Duration,
    /// Overrides `https://{domain}` as the root of every request.
    pub base_url: Option<String>,
}

impl ProfileStoreConfig {
    pub fn new(domain: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            domain: domain.to_string(),
            client_id: client_id.to_string(),
            client_secret: Secret::new(client_secret.to_string()),
            audience: format!("https://{domain}/api/v2/"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: None,
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Loads the Management API credentials from the environment.
    ///
    /// Returns `None` when the service client credentials are not configured. In that case the server runs without a
    /// profile store and only keeps orders locally.
    pub fn new_from_env() -> Option<Self> {
        let domain = std::env::var("AUTH0_DOMAIN").ok().filter(|s| !s.is_empty())?;
        let client_id = std::env::var("AUTH0_MGMT_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let client_secret = std::env::var("AUTH0_MGMT_CLIENT_SECRET").ok().filter(|s| !s.is_empty());
        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                warn!(
                    "🪛️ AUTH0_MGMT_CLIENT_ID and/or AUTH0_MGMT_CLIENT_SECRET are not set. Orders will not be mirrored \
                     to user profiles."
                );
                return None;
            },
        };
        let mut config = Self::new(&domain, &client_id, &client_secret);
        if let Ok(audience) = std::env::var("AUTH0_MGMT_AUDIENCE") {
            config.audience = audience;
        }
        config.timeout = Duration::from_secs(parse_env_or_default("PROFILE_STORE_TIMEOUT", DEFAULT_TIMEOUT_SECS));
        Some(config)
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| format!("https://{}", self.domain))
    }
}
