//! Bearer token verification
//!
//! Access tokens are RS256 JWTs issued by the identity provider. The provider publishes its signing keys as a JWKS
//! document, which is fetched on first use and again whenever a token names a key id that is not cached yet.
//!
//! Verification here covers the signature, the issuer and the audience. Expiry, permissions and the email-verified
//! flag are checked by the order engine, so that every route applies them in the same order.
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use jwt_compact::{alg::Rsa, AlgorithmExt, UntrustedToken};
use log::*;
use order_engine::OrderClaims;
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The JWKS is not re-fetched more often than this, however many unknown key ids turn up. Failed fetches count too.
const MIN_JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The `aud` claim may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(a) => a == audience,
            Self::Many(list) => list.iter().any(|a| a == audience),
        }
    }
}

/// The claims carried by an access token, apart from the registered time claims, which jwt-compact handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Option<String>,
    pub iss: Option<String>,
    pub aud: Option<Audience>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Everything else, including the namespaced custom claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

impl Jwk {
    fn into_rsa_key(self) -> Option<(String, RsaPublicKey)> {
        let kid = self.kid?;
        if self.kty != "RSA" {
            trace!("🔑️ Skipping {} key {kid}", self.kty);
            return None;
        }
        let n = base64::decode_config(self.n?, base64::URL_SAFE_NO_PAD).ok()?;
        let e = base64::decode_config(self.e?, base64::URL_SAFE_NO_PAD).ok()?;
        match RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e)) {
            Ok(key) => Some((kid, key)),
            Err(err) => {
                warn!("🔑️ Ignoring invalid RSA key {kid} in the JWKS. {err}");
                None
            },
        }
    }
}

/// Verifies access tokens against the identity provider's signing keys. One instance is shared by all workers.
pub struct TokenVerifier {
    config: AuthConfig,
    jwks_url: Option<String>,
    client: reqwest::Client,
    keys: RwLock<HashMap<String, RsaPublicKey>>,
    /// When the JWKS was last requested. Held for the duration of a fetch, so that only one fetch runs at a time.
    last_refresh: Mutex<Option<Instant>>,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
        let jwks_url = Some(config.jwks_url());
        Ok(Self { config, jwks_url, client, keys: RwLock::default(), last_refresh: Mutex::default() })
    }

    /// A verifier with a fixed set of keys that never fetches a JWKS.
    pub fn with_keys(config: AuthConfig, keys: HashMap<String, RsaPublicKey>) -> Self {
        Self {
            config,
            jwks_url: None,
            client: reqwest::Client::new(),
            keys: RwLock::new(keys),
            last_refresh: Mutex::default(),
        }
    }

    /// Fetches signing keys from `url` instead of the identity provider's well-known location.
    pub fn with_jwks_url<S: Into<String>>(mut self, url: S) -> Self {
        self.jwks_url = Some(url.into());
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Checks the token's signature, issuer and audience, and returns the claims the order engine works with.
    pub async fn verify(&self, token: &str) -> Result<OrderClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let kid = untrusted
            .header()
            .key_id
            .clone()
            .ok_or_else(|| AuthError::PoorlyFormattedToken("The token header has no key id".into()))?;
        let key = self.signing_key(&kid).await?;
        let token = Rsa::rs256()
            .validator::<AccessTokenClaims>(&key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        let claims = token.claims();
        let issuer = self.config.issuer();
        if claims.custom.iss.as_deref() != Some(issuer.as_str()) {
            debug!("🔑️ Token issuer {:?} does not match {issuer}", claims.custom.iss);
            return Err(AuthError::InvalidIssuer(issuer));
        }
        if !claims.custom.aud.as_ref().is_some_and(|aud| aud.contains(&self.config.audience)) {
            debug!("🔑️ Token audience {:?} does not include {}", claims.custom.aud, self.config.audience);
            return Err(AuthError::InvalidAudience(self.config.audience.clone()));
        }
        trace!("🔑️ Token for {:?} verified", claims.custom.sub);
        Ok(OrderClaims {
            subject: claims.custom.sub.clone(),
            expiry: claims.expiration,
            permissions: claims.custom.permissions.clone(),
            email_verified: claims.custom.extra.get(&self.config.email_verified_claim).cloned(),
        })
    }

    async fn cached_key(&self, kid: &str) -> Option<RsaPublicKey> {
        self.keys.read().await.get(kid).cloned()
    }

    /// Looks up a signing key, refreshing the JWKS if `kid` is unknown. The key map is only locked to read it and to
    /// swap in a fresh set, never while the JWKS is being fetched.
    async fn signing_key(&self, kid: &str) -> Result<RsaPublicKey, AuthError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        let Some(url) = self.jwks_url.as_deref() else {
            return Err(AuthError::UnknownSigningKey(kid.to_string()));
        };
        let mut last_refresh = self.last_refresh.lock().await;
        // Another request may have refreshed the keys while we waited for the lock
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        if last_refresh.is_some_and(|t| t.elapsed() < MIN_JWKS_REFRESH_INTERVAL) {
            debug!("🔑️ Key {kid} is unknown, and the signing keys were requested recently");
            return Err(AuthError::UnknownSigningKey(kid.to_string()));
        }
        *last_refresh = Some(Instant::now());
        let keys = self.fetch_jwks(url).await?;
        let key = keys.get(kid).cloned();
        *self.keys.write().await = keys;
        key.ok_or_else(|| AuthError::UnknownSigningKey(kid.to_string()))
    }

    async fn fetch_jwks(&self, url: &str) -> Result<HashMap<String, RsaPublicKey>, AuthError> {
        debug!("🔑️ Fetching signing keys from {url}");
        let response = self.client.get(url).send().await.map_err(|e| AuthError::KeyFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!("{url} returned {}", response.status())));
        }
        let jwks = response.json::<Jwks>().await.map_err(|e| AuthError::KeyFetch(e.to_string()))?;
        let keys = jwks.keys.into_iter().filter_map(Jwk::into_rsa_key).collect::<HashMap<_, _>>();
        info!("🔑️ Loaded {} signing keys", keys.len());
        Ok(keys)
    }
}

/// The verified claims of the request's bearer token, if it has one.
///
/// A request without an `Authorization` header extracts as `BearerClaims(None)`, and the order engine decides whether
/// that is acceptable. A header that is present but does not hold a valid token rejects the request outright.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Option<OrderClaims>);

impl BearerClaims {
    pub fn claims(&self) -> Option<&OrderClaims> {
        self.0.as_ref()
    }
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingBearer),
    }
}

impl FromRequest for BearerClaims {
    type Error = ServerError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verifier = req.app_data::<web::Data<TokenVerifier>>().cloned();
        let header = req.headers().get(AUTHORIZATION).map(|h| h.to_str().map(str::to_string));
        Box::pin(async move {
            let header = match header {
                None => return Ok(BearerClaims(None)),
                Some(h) => h.map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?,
            };
            let token = bearer_token(&header)?;
            let verifier =
                verifier.ok_or_else(|| ServerError::ConfigurationError("No token verifier is configured".into()))?;
            let claims = verifier.verify(token).await?;
            Ok(BearerClaims(Some(claims)))
        })
    }
}
