// Module declarations
pub(crate) mod transactions_errors;
pub(crate) mod transactions_log;
pub(crate) mod transactions_model;
pub(crate) mod transactions_service;

// Re-export the public interface
pub use transactions_log::TransactionLog;
pub use transactions_model::{
    LedgerSnapshot, NewTransaction, Transaction, TransactionKind, TransactionRecord,
};
pub use transactions_service::TransactionService;

// Re-export error types for convenience
pub use transactions_errors::{Result, TransactionError};
