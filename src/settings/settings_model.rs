use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User-set fund configuration, read and written through an external config
/// store. Only the summary uses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundSettings {
    /// Total funds earmarked for gold. Zero means "not configured".
    pub total_funds: Decimal,
    /// Target sell price per gram; zero disables target tracking.
    pub target_price: Decimal,
}

impl FundSettings {
    pub fn new(total_funds: Decimal, target_price: Decimal) -> Self {
        FundSettings {
            total_funds,
            target_price,
        }
    }

    /// The fund base used for utilization metrics: the configured total when
    /// set and non-zero, otherwise whatever has actually been invested.
    pub fn actual_total_funds(&self, total_invested: Decimal) -> Decimal {
        if self.total_funds > Decimal::ZERO {
            self.total_funds
        } else {
            total_invested
        }
    }
}
