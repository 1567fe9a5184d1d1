use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for transaction-related operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Invalid quantity {0}: quantity must be positive")]
    InvalidQuantity(Decimal),
    #[error("Invalid unit price {0}: price must be positive")]
    InvalidPrice(Decimal),
    #[error("Insufficient holdings in account {account_id}: selling {requested} g with only {held} g held")]
    InsufficientHoldings {
        account_id: String,
        requested: Decimal,
        held: Decimal,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for transaction operations
pub type Result<T> = std::result::Result<T, TransactionError>;
