use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid profile store URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not obtain a service token. {0}")]
    TokenExchange(String),
}
