// Module declarations
pub(crate) mod settings_model;

// Re-export the public interface
pub use settings_model::FundSettings;
