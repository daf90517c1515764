//! Server configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded first by `main`). Missing or invalid values
//! are logged and replaced with defaults, so the server always starts; requests that need a missing value will fail
//! instead.
use std::env;

use log::*;
use order_common::{parse_boolean_flag, parse_env_or_default};
use profile_store::ProfileStoreConfig;

const DEFAULT_ORDERS_HOST: &str = "127.0.0.1";
const DEFAULT_ORDERS_PORT: u16 = 3001;
const DEFAULT_MIRROR_BUFFER_SIZE: usize = 64;
pub const DEFAULT_EMAIL_VERIFIED_CLAIM: &str = "https://pizza42.example.com/email_verified";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    /// Management API credentials. When `None`, orders are kept locally only.
    pub profile_store: Option<ProfileStoreConfig>,
    /// The number of new orders that may be waiting to be mirrored before further orders are dropped from the mirror
    /// queue. Orders are always stored locally, regardless.
    pub mirror_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ORDERS_HOST.to_string(),
            port: DEFAULT_ORDERS_PORT,
            auth: AuthConfig::default(),
            profile_store: None,
            mirror_buffer_size: DEFAULT_MIRROR_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ORDERS_HOST").ok().unwrap_or_else(|| DEFAULT_ORDERS_HOST.into());
        let port = parse_env_or_default("ORDERS_PORT", DEFAULT_ORDERS_PORT);
        let auth = AuthConfig::from_env_or_default();
        let mirroring = parse_boolean_flag(env::var("ORDERS_MIRROR_ENABLED").ok(), true);
        let profile_store = if mirroring {
            ProfileStoreConfig::new_from_env()
        } else {
            info!("🪛️ Mirroring is disabled (ORDERS_MIRROR_ENABLED). Orders are kept in memory only.");
            None
        };
        let mirror_buffer_size = match parse_env_or_default("ORDERS_MIRROR_BUFFER_SIZE", DEFAULT_MIRROR_BUFFER_SIZE) {
            0 => {
                warn!("🪛️ ORDERS_MIRROR_BUFFER_SIZE must be at least 1. Using {DEFAULT_MIRROR_BUFFER_SIZE}.");
                DEFAULT_MIRROR_BUFFER_SIZE
            },
            n => n,
        };
        Self { host, port, auth, profile_store, mirror_buffer_size }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
/// Identity provider settings. None of these are secret: the SPA receives most of them from `/auth_config.json`.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The tenant domain, e.g. "pizza42.us.auth0.com". Tokens must be issued by `https://{domain}/`.
    pub domain: String,
    /// The API identifier. Tokens must list it in their `aud` claim.
    pub audience: String,
    /// The single-page app's client id.
    pub client_id: String,
    /// The name of the custom claim that carries the user's email-verified flag. Custom claims must be namespaced, so
    /// this is a URL rather than plain `email_verified`.
    pub email_verified_claim: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::default(),
            audience: String::default(),
            client_id: String::default(),
            email_verified_claim: DEFAULT_EMAIL_VERIFIED_CLAIM.to_string(),
        }
    }
}

impl AuthConfig {
    pub fn new(domain: &str, audience: &str) -> Self {
        Self { domain: domain.to_string(), audience: audience.to_string(), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let domain = env::var("AUTH0_DOMAIN").ok().unwrap_or_else(|| {
            error!("🪛️ AUTH0_DOMAIN is not set. No access token can be verified until it is.");
            String::default()
        });
        let audience = env::var("AUTH0_AUDIENCE").ok().unwrap_or_else(|| {
            error!("🪛️ AUTH0_AUDIENCE is not set. Please set it to the identifier of the orders API.");
            String::default()
        });
        let client_id = env::var("AUTH0_CLIENT_ID").ok().unwrap_or_else(|| {
            warn!("🪛️ AUTH0_CLIENT_ID is not set. The SPA will not be able to log users in.");
            String::default()
        });
        let email_verified_claim = env::var("AUTH0_EMAIL_VERIFIED_CLAIM").ok().unwrap_or_else(|| {
            info!("🪛️ AUTH0_EMAIL_VERIFIED_CLAIM is not set. Using {DEFAULT_EMAIL_VERIFIED_CLAIM}");
            DEFAULT_EMAIL_VERIFIED_CLAIM.to_string()
        });
        Self { domain, audience, client_id, email_verified_claim }
    }

    /// The expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}
