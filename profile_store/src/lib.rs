//! # Profile store client
//!
//! A thin REST client for the identity provider's Management API, which this system uses as a remote,
//! per-user profile store. The only part of the profile the order service touches is the `orders` array stored in
//! the user's `user_metadata`.
//!
//! Every call is authenticated with a short-lived service token obtained through a client-credentials exchange.
//! Tokens are cached until shortly before they expire.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::ProfileStoreApi;
pub use config::ProfileStoreConfig;
pub use data_objects::{ServiceToken, UserProfile};
pub use error::ProfileStoreError;
