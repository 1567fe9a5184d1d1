use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::transactions::TransactionKind;
use crate::utils::decimal_serde::*;

use super::accounts_errors::{AccountError, Result};

/// How an account charges for selling gold. The policy is a static property
/// of the account, not something chosen at transaction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "camelCase")]
pub enum FeePolicy {
    /// Fixed currency amount per gram sold
    FlatPerUnit {
        #[serde(with = "decimal_serde")]
        rate: Decimal,
    },
    /// Fraction of the sale notional
    ProportionalOfNotional {
        #[serde(with = "decimal_serde")]
        rate: Decimal,
    },
}

impl FeePolicy {
    /// Fee charged when selling `quantity` grams for `notional` currency.
    /// Both arguments are taken by absolute value, so signed transaction
    /// fields can be passed directly.
    pub fn sell_fee(&self, quantity: Decimal, notional: Decimal) -> Decimal {
        match self {
            FeePolicy::FlatPerUnit { rate } => *rate * quantity.abs(),
            FeePolicy::ProportionalOfNotional { rate } => *rate * notional.abs(),
        }
    }

    /// Unit price at which selling the full holding nets exactly the cost
    /// basis behind `avg_cost`.
    pub fn break_even_price(&self, avg_cost: Decimal) -> Decimal {
        match self {
            FeePolicy::FlatPerUnit { rate } => avg_cost + *rate,
            FeePolicy::ProportionalOfNotional { rate } => {
                let retained = Decimal::ONE - *rate;
                if retained <= Decimal::ZERO {
                    warn!("Proportional fee rate {} leaves no proceeds; break-even undefined, reporting zero", rate);
                    Decimal::ZERO
                } else {
                    avg_cost / retained
                }
            }
        }
    }
}

/// Domain model representing a custodial account (bank) through which gold
/// is bought and sold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub fee_policy: FeePolicy,
}

impl Account {
    pub fn new(id: &str, name: &str, fee_policy: FeePolicy) -> Self {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            fee_policy,
        }
    }
}

/// Whitelist of recognized accounts. Every operation that touches account
/// quantity, price, or fee math resolves the account through the registry
/// first; unknown identifiers fail with `InvalidAccount`.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl Default for AccountRegistry {
    /// The three channels the tracker was built around: Minsheng over the
    /// counter (flat 3/g sell fee) and Minsheng/Zheshang via JD (0.4% of
    /// notional).
    fn default() -> Self {
        AccountRegistry::new(vec![
            Account::new(
                "minsheng",
                "Minsheng Bank",
                FeePolicy::FlatPerUnit { rate: dec!(3) },
            ),
            Account::new(
                "minsheng_jd",
                "Minsheng Bank (JD)",
                FeePolicy::ProportionalOfNotional { rate: dec!(0.004) },
            ),
            Account::new(
                "zheshang_jd",
                "Zheshang Bank (JD)",
                FeePolicy::ProportionalOfNotional { rate: dec!(0.004) },
            ),
        ])
    }
}

impl AccountRegistry {
    pub fn new(accounts: Vec<Account>) -> Self {
        AccountRegistry { accounts }
    }

    /// Resolves an account id against the whitelist.
    pub fn get(&self, account_id: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .ok_or_else(|| AccountError::InvalidAccount(account_id.to_string()))
    }

    /// All recognized accounts, in registration order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Fee charged for a transaction. Purchases are always free; sales are
    /// charged per the account's fee policy.
    pub fn fee(
        &self,
        kind: TransactionKind,
        account_id: &str,
        quantity: Decimal,
        notional: Decimal,
    ) -> Result<Decimal> {
        let account = self.get(account_id)?;
        Ok(match kind {
            TransactionKind::Purchase => Decimal::ZERO,
            TransactionKind::Sale => account.fee_policy.sell_fee(quantity, notional),
        })
    }
}
