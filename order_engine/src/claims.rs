//! Claim checks for order requests.
//!
//! Token signatures, issuers and audiences are verified before claims reach the engine. What remains to be checked
//! here is the part that is specific to orders: whether the token is still fresh, who it belongs to, and what it allows
//! them to do. The checks run in a fixed order and the first failure wins.
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    order_api::errors::{ForbiddenReason, OrderError},
    order_types::Permission,
};

/// The decoded claims of a verified access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderClaims {
    pub subject: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// The raw value of the provider-namespaced email-verified claim. Only the JSON boolean `true` counts as verified.
    pub email_verified: Option<Value>,
}

impl OrderClaims {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.as_str())
    }

    pub fn is_email_verified(&self) -> bool {
        matches!(self.email_verified, Some(Value::Bool(true)))
    }

    /// The subject, if it is present and non-empty.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }
}

fn check_expiry(claims: &OrderClaims, now: DateTime<Utc>) -> Result<(), OrderError> {
    match claims.expiry {
        None => Err(OrderError::Unauthenticated("The access token has no expiry".into())),
        Some(exp) if exp <= now => {
            debug!("🔑️ Token expired at {exp}");
            Err(OrderError::TokenExpired)
        },
        Some(_) => Ok(()),
    }
}

fn check_permission(claims: &OrderClaims, permission: Permission) -> Result<(), OrderError> {
    if claims.has_permission(permission) {
        Ok(())
    } else {
        Err(OrderError::Forbidden(ForbiddenReason::MissingPermission(permission)))
    }
}

fn require_claims(claims: Option<&OrderClaims>) -> Result<&OrderClaims, OrderError> {
    claims.ok_or_else(|| OrderError::Unauthenticated("No access token was provided".into()))
}

fn authenticated_subject(claims: &OrderClaims, now: DateTime<Utc>) -> Result<&str, OrderError> {
    let subject = claims
        .subject()
        .ok_or_else(|| OrderError::Unauthenticated("The access token does not identify a user".into()))?;
    check_expiry(claims, now)?;
    Ok(subject)
}

/// Confirms the token is present, identifies someone, and has not expired. Returns the subject.
pub fn authenticate(claims: Option<&OrderClaims>, now: DateTime<Utc>) -> Result<&str, OrderError> {
    authenticated_subject(require_claims(claims)?, now)
}

/// Checks for placing an order: authentication, then `create:orders`, then a verified email address.
pub fn authorize_create(claims: Option<&OrderClaims>, now: DateTime<Utc>) -> Result<&str, OrderError> {
    let claims = require_claims(claims)?;
    let subject = authenticated_subject(claims, now)?;
    check_permission(claims, Permission::CreateOrders)?;
    if !claims.is_email_verified() {
        debug!("🔑️ {subject} tried to order without a verified email address");
        return Err(OrderError::Forbidden(ForbiddenReason::EmailNotVerified));
    }
    Ok(subject)
}

/// Checks for reading order history. No email verification is needed to read.
pub fn authorize_read(claims: Option<&OrderClaims>, now: DateTime<Utc>) -> Result<&str, OrderError> {
    let claims = require_claims(claims)?;
    check_expiry(claims, now)?;
    let subject = claims.subject().ok_or(OrderError::MissingSubject)?;
    check_permission(claims, Permission::ReadOrders)?;
    Ok(subject)
}
