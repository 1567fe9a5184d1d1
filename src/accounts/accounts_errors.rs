use thiserror::Error;

/// Custom error type for account-related operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Unknown account '{0}'")]
    InvalidAccount(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for account operations
pub type Result<T> = std::result::Result<T, AccountError>;
