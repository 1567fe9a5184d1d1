use rust_decimal::Decimal;

use crate::accounts::{Account, AccountRegistry};
use crate::errors::Result;
use crate::quotes::PriceBoard;
use crate::transactions::{Transaction, TransactionKind};

use super::cost_basis::CostBasisCalculator;
use super::portfolio_model::{AccountBasis, AccountValuation};

/// Prices per-account holdings at the supplied quotes: gross and net value,
/// the fee a full liquidation would cost, break-even price, and unrealized
/// P/L. Pure read-side projection, recomputed on demand.
#[derive(Debug, Clone)]
pub struct ValuationEngine<'a> {
    registry: &'a AccountRegistry,
}

impl<'a> ValuationEngine<'a> {
    pub fn new(registry: &'a AccountRegistry) -> Self {
        ValuationEngine { registry }
    }

    /// Values one account given its basis state. An account is active while
    /// it holds a positive quantity; otherwise the valuation fields are zero
    /// by policy (the current price is still reported).
    pub fn value_account(
        &self,
        account: &Account,
        basis: &AccountBasis,
        prices: &PriceBoard,
        realized_pnl: Decimal,
    ) -> AccountValuation {
        let current_price = prices.resolve(&account.id);

        let mut valuation = AccountValuation {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            quantity: basis.quantity,
            total_cost: basis.total_cost,
            avg_cost: basis.avg_cost,
            current_price,
            gross_value: Decimal::ZERO,
            sell_fee: Decimal::ZERO,
            net_value: Decimal::ZERO,
            break_even_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            realized_pnl,
        };

        if basis.quantity > Decimal::ZERO {
            valuation.gross_value = basis.quantity * current_price;
            valuation.sell_fee = account
                .fee_policy
                .sell_fee(basis.quantity, valuation.gross_value);
            valuation.net_value = valuation.gross_value - valuation.sell_fee;
            valuation.break_even_price = account.fee_policy.break_even_price(basis.avg_cost);
            valuation.unrealized_pnl = valuation.net_value - basis.total_cost;
        }

        valuation
    }

    /// Values every registry account from the log, in registration order.
    /// Inactive accounts still appear, carrying their accumulated realized
    /// P/L for historical reporting.
    pub fn value_portfolio(
        &self,
        transactions: &[Transaction],
        prices: &PriceBoard,
    ) -> Result<Vec<AccountValuation>> {
        let states = CostBasisCalculator::new().compute(transactions, self.registry)?;

        let valuations = self
            .registry
            .accounts()
            .iter()
            .map(|account| {
                let basis = states.get(&account.id).cloned().unwrap_or_default();
                let realized = realized_pnl_for(transactions, &account.id);
                self.value_account(account, &basis, prices, realized)
            })
            .collect();

        Ok(valuations)
    }
}

/// Sum of the frozen realized P/L of an account's sales. Purchases carry
/// zero, so summing over sales only is an optimization, not a policy.
fn realized_pnl_for(transactions: &[Transaction], account_id: &str) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.account_id == account_id && t.kind == TransactionKind::Sale)
        .map(|t| t.realized_pnl)
        .sum()
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
    fn test_flat_fee_account_valuation() {
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

        let engine = ValuationEngine::new(service.registry());
        let valuations = engine
            .value_portfolio(service.log().transactions(), &prices)
            .unwrap();
        let minsheng = valuations
            .iter()
            .find(|v| v.account_id == "minsheng")
            .unwrap();

        assert_eq!(minsheng.avg_cost, dec!(500));
        assert_eq!(minsheng.break_even_price, dec!(503));
        assert_eq!(minsheng.gross_value, dec!(5100));
        assert_eq!(minsheng.sell_fee, dec!(30));
        assert_eq!(minsheng.net_value, dec!(5070));
        // 10 * (510 - 3 - 500)
        assert_eq!(minsheng.unrealized_pnl, dec!(70));
    }

    #[test]
    fn test_inactive_account_keeps_realized_history() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(4),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();
        service
            .record_sale(NewTransaction::sale(
                "minsheng",
                dec!(4),
                dec!(520),
                date("2024-03-08"),
            ))
            .unwrap();

        let prices = PriceBoard::new();
        let engine = ValuationEngine::new(service.registry());
        let valuations = engine
            .value_portfolio(service.log().transactions(), &prices)
            .unwrap();
        let minsheng = valuations
            .iter()
            .find(|v| v.account_id == "minsheng")
            .unwrap();

        assert_eq!(minsheng.quantity, Decimal::ZERO);
        assert_eq!(minsheng.gross_value, Decimal::ZERO);
        assert_eq!(minsheng.break_even_price, Decimal::ZERO);
        // (520 - 500) * 4 - 12
        assert_eq!(minsheng.realized_pnl, dec!(68));
    }
}
