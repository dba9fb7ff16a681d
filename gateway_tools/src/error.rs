use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the payment gateway: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl GatewayApiError {
    /// Network failures, server errors and rate limiting are worth another try. Everything else will fail the same
    /// way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestError(_) => true,
            Self::QueryError { status, .. } => *status >= 500 || *status == 429,
            Self::Initialization(_) | Self::JsonError(_) => false,
        }
    }
}
