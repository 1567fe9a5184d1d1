use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::decimal_serde::*;

/// Derived cost-basis state of one account: net held grams and the total
/// currency cost attributed to them. Recomputed from the log, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBasis {
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_cost: Decimal,
    /// `total_cost / quantity` while quantity is positive, zero otherwise.
    #[serde(with = "decimal_serde")]
    pub avg_cost: Decimal,
}

/// Read-side valuation of one account at the supplied prices. Accounts with
/// no current holdings report zero valuation fields but keep their
/// accumulated realized P/L visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountValuation {
    pub account_id: String,
    pub account_name: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_cost: Decimal,
    #[serde(with = "decimal_serde")]
    pub avg_cost: Decimal,
    #[serde(with = "decimal_serde")]
    pub current_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub gross_value: Decimal,
    /// Fee a full liquidation at the current price would incur.
    #[serde(with = "decimal_serde")]
    pub sell_fee: Decimal,
    #[serde(with = "decimal_serde")]
    pub net_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub break_even_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub unrealized_pnl: Decimal,
    /// Sum of the frozen realized P/L of this account's sales.
    #[serde(with = "decimal_serde")]
    pub realized_pnl: Decimal,
}

/// Portfolio-level metrics derived fresh from the full log, the current
/// prices, and the fund settings on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(with = "decimal_serde")]
    pub total_profit_loss: Decimal,
    #[serde(with = "decimal_serde")]
    pub profit_rate: Decimal,
    #[serde(with = "decimal_serde")]
    pub gross_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub net_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub sell_fees: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_invested: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_sold_proceeds: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_fees: Decimal,
    #[serde(with = "decimal_serde")]
    pub actual_total_funds: Decimal,
    #[serde(with = "decimal_serde")]
    pub remaining_funds: Decimal,
    #[serde(with = "decimal_serde")]
    pub usage_rate: Decimal,
    /// Net held grams across all accounts.
    #[serde(with = "decimal_serde")]
    pub total_quantity: Decimal,
    /// Quantity-weighted average cost over active accounts.
    #[serde(with = "decimal_serde")]
    pub avg_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub break_even_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub weighted_current_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub realized_pnl: Decimal,
    #[serde(with = "decimal_serde")]
    pub target_progress: Decimal,
    pub purchase_count: usize,
    pub sale_count: usize,
    pub total_trades: usize,
    /// Net held grams per account id, including inactive accounts.
    pub account_quantities: HashMap<String, Decimal>,
}
