// Module declarations
pub(crate) mod quotes_model;

// Re-export the public interface
pub use quotes_model::{PriceBoard, PriceQuote};
