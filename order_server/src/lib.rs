//! # Order server
//! This crate hosts the HTTP API of the pizza order service. It is responsible for:
//! Verifying the bearer tokens issued by the identity provider.
//! Handing verified claims and request payloads to the order engine.
//! Wiring the profile store in as the remote mirror for new orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth_config.json`: The public identity provider settings for the single-page app.
//! * `/api/orders`: `POST` places an order, `GET` returns the caller's order history.
//! * `/api/external`: Confirms that the caller's access token is valid.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
