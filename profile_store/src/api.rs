use std::sync::Arc;

use chrono::Utc;
use log::*;
use order_common::Secret;
use reqwest::{Client, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::{
    config::ProfileStoreConfig,
    data_objects::{CachedToken, ServiceToken, UserProfile},
    ProfileStoreError,
};

#[derive(Clone)]
pub struct ProfileStoreApi {
    config: ProfileStoreConfig,
    client: Arc<Client>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl ProfileStoreApi {
    pub fn new(config: ProfileStoreConfig) -> Result<Self, ProfileStoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProfileStoreError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(Mutex::new(None)) })
    }

    pub fn config(&self) -> &ProfileStoreConfig {
        &self.config
    }

    /// Builds a URL under the configured root. Each segment is percent-encoded individually, so subject identifiers
    /// containing reserved characters are safe to pass in.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ProfileStoreError> {
        let mut url = Url::parse(&self.config.base_url()).map_err(|e| ProfileStoreError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProfileStoreError::InvalidUrl(format!("{} cannot be a base URL", self.config.base_url())))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs the client-credentials exchange against the identity provider and returns a bearer token for the
    /// Management API. A previously issued token is reused until it is close to expiry.
    pub async fn fetch_service_token(&self) -> Result<Secret<String>, ProfileStoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            trace!("🪪️ Reusing cached service token");
            return Ok(token.token.clone());
        }
        let url = self.url(&["oauth", "token"])?;
        debug!("🪪️ Requesting a new service token from {url}");
        let body = json!({
            "grant_type": "client_credentials",
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret.reveal(),
            "audience": self.config.audience,
        });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProfileStoreError::TokenExchange(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProfileStoreError::TokenExchange(format!("Error {status}. {message}")));
        }
        let token = response.json::<ServiceToken>().await.map_err(|e| ProfileStoreError::JsonError(e.to_string()))?;
        let new_token = CachedToken::new(token, Utc::now())?;
        let secret = new_token.token.clone();
        info!("🪪️ Obtained a new service token, valid until {}", new_token.expires_at);
        *cached = Some(new_token);
        Ok(secret)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<B>,
    ) -> Result<T, ProfileStoreError> {
        let token = self.fetch_service_token().await?;
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url).bearer_auth(token.reveal());
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ProfileStoreError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ProfileStoreError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message =
                response.text().await.map_err(|e| ProfileStoreError::RestResponseError(e.to_string()))?;
            Err(ProfileStoreError::QueryError { status, message })
        }
    }

    pub async fn fetch_user(&self, subject: &str) -> Result<UserProfile, ProfileStoreError> {
        let url = self.url(&["api", "v2", "users", subject])?;
        debug!("Fetching profile for {subject}");
        self.rest_query::<UserProfile, ()>(Method::GET, url, None).await
    }

    /// Fetches the raw mirrored order entries stored in the user's profile. The entries are returned untouched;
    /// interpreting them is the caller's responsibility.
    pub async fn fetch_order_history(&self, subject: &str) -> Result<Vec<Value>, ProfileStoreError> {
        let profile = self.fetch_user(subject).await?;
        let orders = profile.order_history()?;
        debug!("Profile for {subject} holds {} mirrored orders", orders.len());
        Ok(orders)
    }

    /// Replaces the complete `orders` array in the user's metadata. The Management API has no append primitive, so
    /// concurrent writers can overwrite each other's changes.
    pub async fn replace_order_history(
        &self,
        subject: &str,
        orders: Vec<Value>,
    ) -> Result<UserProfile, ProfileStoreError> {
        let url = self.url(&["api", "v2", "users", subject])?;
        let count = orders.len();
        let body = json!({ "user_metadata": { "orders": orders } });
        let profile = self.rest_query::<UserProfile, Value>(Method::PATCH, url, Some(body)).await?;
        info!("Stored {count} orders in the profile for {subject}");
        Ok(profile)
    }
}
