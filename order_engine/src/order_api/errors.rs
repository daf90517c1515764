use std::fmt::Display;

use thiserror::Error;

use crate::order_types::Permission;

/// Reasons an authenticated caller may be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    MissingPermission(Permission),
    /// Only raised when placing orders. Callers can use this to prompt the user to verify their email address.
    EmailNotVerified,
}

impl Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPermission(p) => write!(f, "The access token does not grant the {p} permission."),
            Self::EmailNotVerified => {
                f.write_str("Please verify your email address before placing an order. Check your inbox for a link.")
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Authentication required. {0}")]
    Unauthenticated(String),
    #[error("The access token has expired. Please log in again.")]
    TokenExpired,
    #[error("The access token does not identify a user.")]
    MissingSubject,
    #[error("Forbidden. {0}")]
    Forbidden(ForbiddenReason),
    #[error("Invalid order request. {0}")]
    BadRequest(String),
    #[error("Internal error. {0}")]
    Internal(String),
}

/// Failures in the round trip to the remote profile store. These are always recovered from inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    #[error("Could not obtain a service credential. {0}")]
    ServiceCredential(String),
    #[error("Could not fetch mirrored orders. {0}")]
    Fetch(String),
    #[error("Could not update mirrored orders. {0}")]
    Update(String),
    #[error("Mirrored order data is malformed. {0}")]
    Malformed(String),
}
