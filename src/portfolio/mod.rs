// Module declarations
pub(crate) mod cost_basis;
pub(crate) mod portfolio_model;
pub(crate) mod summary;
pub(crate) mod valuation;

// Re-export the public interface
pub use cost_basis::CostBasisCalculator;
pub use portfolio_model::{AccountBasis, AccountValuation, PortfolioSummary};
pub use summary::SummaryAggregator;
pub use valuation::ValuationEngine;
