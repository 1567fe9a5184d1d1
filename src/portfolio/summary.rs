use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::accounts::AccountRegistry;
use crate::errors::Result;
use crate::quotes::PriceBoard;
use crate::settings::FundSettings;
use crate::transactions::{Transaction, TransactionKind};

use super::cost_basis::CostBasisCalculator;
use super::portfolio_model::PortfolioSummary;
use super::valuation::ValuationEngine;

/// Combines all accounts into portfolio-level metrics. Stateless: every call
/// derives the summary fresh from the log, the price board, and the fund
/// settings, so identical inputs produce identical output.
#[derive(Debug, Clone)]
pub struct SummaryAggregator<'a> {
    registry: &'a AccountRegistry,
}

impl<'a> SummaryAggregator<'a> {
    pub fn new(registry: &'a AccountRegistry) -> Self {
        SummaryAggregator { registry }
    }

    pub fn summarize(
        &self,
        transactions: &[Transaction],
        prices: &PriceBoard,
        settings: &FundSettings,
    ) -> Result<PortfolioSummary> {
        debug!("Summarizing portfolio over {} transactions", transactions.len());

        let mut total_invested = Decimal::ZERO;
        let mut total_sold_proceeds = Decimal::ZERO;
        let mut total_fees = Decimal::ZERO;
        let mut total_quantity = Decimal::ZERO;
        let mut realized_pnl = Decimal::ZERO;
        let mut purchase_count = 0usize;
        let mut sale_count = 0usize;

        for transaction in transactions {
            total_quantity += transaction.quantity;
            total_fees += transaction.fee;
            match transaction.kind {
                TransactionKind::Purchase => {
                    total_invested += transaction.notional;
                    purchase_count += 1;
                }
                TransactionKind::Sale => {
                    total_sold_proceeds += transaction.notional.abs();
                    realized_pnl += transaction.realized_pnl;
                    sale_count += 1;
                }
            }
        }

        let valuations =
            ValuationEngine::new(self.registry).value_portfolio(transactions, prices)?;

        // Liquidation-value aggregates and quantity-weighted means, over
        // active accounts only.
        let mut gross_value = Decimal::ZERO;
        let mut sell_fees = Decimal::ZERO;
        let mut net_value = Decimal::ZERO;
        let mut active_weight = Decimal::ZERO;
        let mut weighted_avg_cost = Decimal::ZERO;
        let mut weighted_break_even = Decimal::ZERO;
        let mut weighted_price = Decimal::ZERO;

        for valuation in valuations.iter().filter(|v| v.quantity > Decimal::ZERO) {
            gross_value += valuation.gross_value;
            sell_fees += valuation.sell_fee;
            net_value += valuation.net_value;
            active_weight += valuation.quantity;
            weighted_avg_cost += valuation.avg_cost * valuation.quantity;
            weighted_break_even += valuation.break_even_price * valuation.quantity;
            weighted_price += valuation.current_price * valuation.quantity;
        }

        let avg_price = weighted_mean(weighted_avg_cost, active_weight);
        let break_even_price = weighted_mean(weighted_break_even, active_weight);
        let weighted_current_price = weighted_mean(weighted_price, active_weight);

        // Models "liquidate everything now": current net value against money
        // put in, corrected for past sale proceeds and every fee ever paid.
        // Historical sale fees are subtracted here even though they are also
        // inside each sale's recorded proceeds; this matches the product's
        // reading of fee burden and is kept as is.
        let total_profit_loss = net_value - total_invested + total_sold_proceeds - total_fees;

        let profit_rate = if total_invested > Decimal::ZERO {
            total_profit_loss / total_invested * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let actual_total_funds = settings.actual_total_funds(total_invested);
        let remaining_funds =
            actual_total_funds - total_invested + total_sold_proceeds - total_fees;
        let usage_rate = if actual_total_funds > Decimal::ZERO {
            total_invested / actual_total_funds * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let target_progress = target_progress(
            settings.target_price,
            weighted_current_price,
            break_even_price,
        );

        let account_quantities: HashMap<String, Decimal> = CostBasisCalculator::new()
            .compute(transactions, self.registry)?
            .into_iter()
            .map(|(id, state)| (id, state.quantity))
            .collect();

        Ok(PortfolioSummary {
            total_profit_loss,
            profit_rate,
            gross_value,
            net_value,
            sell_fees,
            total_invested,
            total_sold_proceeds,
            total_fees,
            actual_total_funds,
            remaining_funds,
            usage_rate,
            total_quantity,
            avg_price,
            break_even_price,
            weighted_current_price,
            realized_pnl,
            target_progress,
            purchase_count,
            sale_count,
            total_trades: purchase_count + sale_count,
            account_quantities,
        })
    }
}

fn weighted_mean(weighted_sum: Decimal, weight: Decimal) -> Decimal {
    if weight > Decimal::ZERO {
        weighted_sum / weight
    } else {
        Decimal::ZERO
    }
}

/// Progress toward the target sell price, as a percentage of the distance
/// from break-even. Zero while no target is set or nothing is held.
///
/// When the target price equals the break-even price the ratio is undefined;
/// it reports zero as a sentinel. Whether that state deserves a distinct
/// marker is an unresolved product question.
fn target_progress(
    target_price: Decimal,
    weighted_current_price: Decimal,
    break_even_price: Decimal,
) -> Decimal {
    if target_price <= Decimal::ZERO || weighted_current_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let span = target_price - break_even_price;
    if span.is_zero() {
        warn!("Target price equals break-even price; reporting zero target progress");
        return Decimal::ZERO;
    }
    (weighted_current_price - break_even_price) / span * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::{NewTransaction, TransactionService};
    use rust_decimal_macros::dec;

    fn date(s: &str) -> chrono::NaiveDate {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_log_yields_all_zero_metrics() {
        let registry = AccountRegistry::default();
        let summary = SummaryAggregator::new(&registry)
            .summarize(&[], &PriceBoard::new(), &FundSettings::default())
            .unwrap();

        assert_eq!(summary.total_invested, Decimal::ZERO);
        assert_eq!(summary.total_profit_loss, Decimal::ZERO);
        assert_eq!(summary.profit_rate, Decimal::ZERO);
        assert_eq!(summary.avg_price, Decimal::ZERO);
        assert_eq!(summary.break_even_price, Decimal::ZERO);
        assert_eq!(summary.usage_rate, Decimal::ZERO);
        assert_eq!(summary.target_progress, Decimal::ZERO);
        assert_eq!(summary.total_trades, 0);
    }

    #[test]
    fn test_weighted_means_across_fee_policies() {
        let mut service = TransactionService::new(AccountRegistry::default());
        // 10 g at 500 on the flat-fee account, 5 g at 510 on a proportional
        // one.
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(10),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng_jd",
                dec!(5),
                dec!(510),
                date("2024-03-02"),
            ))
            .unwrap();

        let mut prices = PriceBoard::new();
        prices.set_current_price(dec!(520)).unwrap();

        let summary = SummaryAggregator::new(service.registry())
            .summarize(
                service.log().transactions(),
                &prices,
                &FundSettings::default(),
            )
            .unwrap();

        // Quantity-weighted, not a simple average of 500 and 510.
        let expected_avg = (dec!(500) * dec!(10) + dec!(510) * dec!(5)) / dec!(15);
        assert_eq!(summary.avg_price, expected_avg);

        let expected_break_even =
            (dec!(503) * dec!(10) + dec!(510) / dec!(0.996) * dec!(5)) / dec!(15);
        assert_eq!(summary.break_even_price, expected_break_even);

        assert_eq!(summary.weighted_current_price, dec!(520));
        assert_eq!(summary.total_quantity, dec!(15));
        assert_eq!(summary.purchase_count, 2);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "zheshang_jd",
                dec!(3),
                dec!(498),
                date("2024-04-01"),
            ))
            .unwrap();
        service
            .record_sale(NewTransaction::sale(
                "zheshang_jd",
                dec!(1),
                dec!(505),
                date("2024-04-09"),
            ))
            .unwrap();

        let mut prices = PriceBoard::new();
        prices.set_current_price(dec!(512)).unwrap();
        let settings = FundSettings::new(dec!(10000), dec!(560));

        let aggregator = SummaryAggregator::new(service.registry());
        let first = aggregator
            .summarize(service.log().transactions(), &prices, &settings)
            .unwrap();
        let second = aggregator
            .summarize(service.log().transactions(), &prices, &settings)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fund_utilization_metrics() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(10),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();

        let settings = FundSettings::new(dec!(20000), Decimal::ZERO);
        let summary = SummaryAggregator::new(service.registry())
            .summarize(
                service.log().transactions(),
                &PriceBoard::new(),
                &settings,
            )
            .unwrap();

        assert_eq!(summary.actual_total_funds, dec!(20000));
        assert_eq!(summary.remaining_funds, dec!(15000));
        assert_eq!(summary.usage_rate, dec!(25));
    }

    #[test]
    fn test_target_progress_sentinel_when_target_hits_break_even() {
        // Flat-fee account: avg 500, break-even 503. Target set exactly
        // there must not divide by zero.
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(10),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();

        let mut prices = PriceBoard::new();
        prices.set_current_price(dec!(510)).unwrap();
        let settings = FundSettings::new(Decimal::ZERO, dec!(503));

        let summary = SummaryAggregator::new(service.registry())
            .summarize(service.log().transactions(), &prices, &settings)
            .unwrap();
        assert_eq!(summary.target_progress, Decimal::ZERO);
    }

    #[test]
    fn test_target_progress_midway() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(10),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();

        // Break-even 503, target 523, current 513: halfway.
        let mut prices = PriceBoard::new();
        prices.set_current_price(dec!(513)).unwrap();
        let settings = FundSettings::new(Decimal::ZERO, dec!(523));

        let summary = SummaryAggregator::new(service.registry())
            .summarize(service.log().transactions(), &prices, &settings)
            .unwrap();
        assert_eq!(summary.target_progress, dec!(50));
    }
}
