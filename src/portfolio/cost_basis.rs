use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::accounts::AccountRegistry;
use crate::errors::Result;
use crate::transactions::{Transaction, TransactionKind};

use super::portfolio_model::AccountBasis;

/// Folds the transaction log into per-account running cost basis and
/// quantity.
///
/// The fold uses the net-total-cost method: a sale reduces the basis by its
/// net proceeds (`|notional| - fee`) rather than by a pro-rata share of the
/// average cost. Reported cost per gram after a partial sale therefore
/// reflects the cash actually still tied up in the position.
#[derive(Debug, Clone, Default)]
pub struct CostBasisCalculator {}

impl CostBasisCalculator {
    pub fn new() -> Self {
        CostBasisCalculator {}
    }

    /// Computes the basis state of every recognized account from the log.
    ///
    /// Entries are folded in insertion order, which is the order the slice
    /// carries; the user-entered trade date plays no role here. Every
    /// registry account is present in the output, at zero when it has no
    /// transactions. A transaction against an account outside the registry
    /// fails the whole computation with `InvalidAccount`.
    pub fn compute(
        &self,
        transactions: &[Transaction],
        registry: &AccountRegistry,
    ) -> Result<HashMap<String, AccountBasis>> {
        debug!(
            "Computing cost basis over {} transactions for {} accounts",
            transactions.len(),
            registry.accounts().len()
        );

        let mut states: HashMap<String, AccountBasis> = registry
            .accounts()
            .iter()
            .map(|a| (a.id.clone(), AccountBasis::default()))
            .collect();

        for transaction in transactions {
            let state = states
                .get_mut(&transaction.account_id)
                .ok_or_else(|| {
                    crate::accounts::AccountError::InvalidAccount(transaction.account_id.clone())
                })?;

            // Signed quantity: purchases add, sales subtract.
            state.quantity += transaction.quantity;
            match transaction.kind {
                TransactionKind::Purchase => {
                    state.total_cost += transaction.notional;
                }
                TransactionKind::Sale => {
                    let net_proceeds = transaction.notional.abs() - transaction.fee;
                    state.total_cost -= net_proceeds;
                }
            }
        }

        // Average cost is only meaningful for a positive position. A basis
        // left over after full liquidation (fees exceeding proceeds) is kept
        // in total_cost but reports an average of zero by policy.
        for state in states.values_mut() {
            state.avg_cost = if state.quantity > Decimal::ZERO {
                state.total_cost / state.quantity
            } else {
                Decimal::ZERO
            };
        }

        Ok(states)
    }

    /// Basis of a single account; zero state when it has no transactions.
    pub fn account_basis(
        &self,
        transactions: &[Transaction],
        registry: &AccountRegistry,
        account_id: &str,
    ) -> Result<AccountBasis> {
        registry.get(account_id)?;
        let mut states = self.compute(transactions, registry)?;
        Ok(states.remove(account_id).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::NewTransaction;
    use crate::transactions::TransactionService;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> chrono::NaiveDate {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_purchase_then_partial_sale_uses_net_total_cost() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(10),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();
        service
            .record_sale(NewTransaction::sale(
                "minsheng",
                dec!(4),
                dec!(520),
                date("2024-03-05"),
            ))
            .unwrap();

        let basis = CostBasisCalculator::new()
            .account_basis(
                service.log().transactions(),
                service.registry(),
                "minsheng",
            )
            .unwrap();

        // Sale proceeds 4*520 = 2080, fee 4*3 = 12, net 2068.
        assert_eq!(basis.quantity, dec!(6));
        assert_eq!(basis.total_cost, dec!(2932));
        assert_eq!(basis.avg_cost.round_dp(2), dec!(488.67));
    }

    #[test]
    fn test_full_liquidation_reports_zero_avg_cost() {
        let mut service = TransactionService::new(AccountRegistry::default());
        service
            .record_purchase(NewTransaction::purchase(
                "minsheng",
                dec!(2),
                dec!(500),
                date("2024-03-01"),
            ))
            .unwrap();
        // Selling at a price so low that fees exceed the move leaves a
        // residual total_cost with zero quantity; avg_cost must not divide.
        service
            .record_sale(NewTransaction::sale(
                "minsheng",
                dec!(2),
                dec!(500),
                date("2024-03-02"),
            ))
            .unwrap();

        let basis = CostBasisCalculator::new()
            .account_basis(
                service.log().transactions(),
                service.registry(),
                "minsheng",
            )
            .unwrap();

        assert_eq!(basis.quantity, Decimal::ZERO);
        // Proceeds 1000 less 6 fee leaves 6 of cost stranded.
        assert_eq!(basis.total_cost, dec!(6));
        assert_eq!(basis.avg_cost, Decimal::ZERO);
    }

    #[test]
    fn test_every_registry_account_is_reported() {
        let registry = AccountRegistry::default();
        let states = CostBasisCalculator::new().compute(&[], &registry).unwrap();
        assert_eq!(states.len(), registry.accounts().len());
        assert!(states.values().all(|s| s.quantity.is_zero()));
    }
}
