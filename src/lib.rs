pub mod accounts;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod settings;
pub mod transactions;
pub mod utils;

pub use errors::{Error, Result};
pub use portfolio::*;
pub use transactions::*;
