// Module declarations
pub(crate) mod accounts_errors;
pub(crate) mod accounts_model;

// Re-export the public interface
pub use accounts_model::{Account, AccountRegistry, FeePolicy};

// Re-export error types for convenience
pub use accounts_errors::{AccountError, Result};
