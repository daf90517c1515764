use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use order_engine::OrderError;
use thiserror::Error;

use crate::data_objects::ErrorResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    OrderError(#[from] OrderError),
}

impl ServerError {
    /// Server-side failures are logged in full, but the caller only gets a generic message.
    fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationError(e) => match e {
                AuthError::KeyFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::OrderError(e) => match e {
                OrderError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                OrderError::TokenExpired => StatusCode::UNAUTHORIZED,
                OrderError::MissingSubject => StatusCode::BAD_REQUEST,
                OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
                OrderError::BadRequest(_) => StatusCode::BAD_REQUEST,
                OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            error!("💻️ Request failed with an internal error. {self}");
            "An internal error occurred. Please try again later.".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::to_string(&ErrorResponse::new(message)).unwrap_or_default())
    }
}

/// Reasons a bearer token is rejected before it reaches the order engine.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("The Authorization header must use the Bearer scheme.")]
    MissingBearer,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token was signed with an unknown key. {0}")]
    UnknownSigningKey(String),
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token was not issued by {0}.")]
    InvalidIssuer(String),
    #[error("Access token was not issued for {0}.")]
    InvalidAudience(String),
    #[error("Could not fetch the token signing keys. {0}")]
    KeyFetch(String),
}
