use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::*;

use super::transactions_errors::{Result, TransactionError};

/// Direction of a gold transaction. Serialized as `buy`/`sell` to stay
/// compatible with exports produced by earlier versions of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "buy")]
    Purchase,
    #[serde(rename = "sell")]
    Sale,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "buy",
            TransactionKind::Sale => "sell",
        }
    }

    /// Sign applied to quantity and notional when the transaction is
    /// recorded: purchases are stored positive, sales negative.
    pub fn sign(&self) -> Decimal {
        match self {
            TransactionKind::Purchase => Decimal::ONE,
            TransactionKind::Sale => Decimal::NEGATIVE_ONE,
        }
    }
}

/// A single entry of the append-only transaction log. Immutable once
/// created; `fee` and `realized_pnl` are computed at creation time and
/// never revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub account_id: String,
    /// Signed grams: positive for purchases, negative for sales. Summing
    /// quantity over a log yields the net held position.
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
    /// Signed currency amount, mirroring the sign of `quantity`.
    #[serde(with = "decimal_serde")]
    pub notional: Decimal,
    #[serde(with = "decimal_serde")]
    pub fee: Decimal,
    /// User-entered trade date; display only, insertion order drives the
    /// economics.
    pub date: NaiveDate,
    /// Zero for purchases. For sales, the gain locked in against the
    /// account's cost basis as it stood just before this sale.
    #[serde(with = "decimal_serde")]
    pub realized_pnl: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input model for recording a new transaction. Quantity and price are
/// unsigned here; the service applies the sign convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub account_id: String,
    pub kind: TransactionKind,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn purchase(account_id: &str, quantity: Decimal, unit_price: Decimal, date: NaiveDate) -> Self {
        NewTransaction {
            account_id: account_id.to_string(),
            kind: TransactionKind::Purchase,
            quantity,
            unit_price,
            date,
        }
    }

    /// Purchase entered by currency amount instead of weight ("spend 5000
    /// at 500/g"); the weight is derived from the amount.
    pub fn purchase_by_amount(
        account_id: &str,
        amount: Decimal,
        unit_price: Decimal,
        date: NaiveDate,
    ) -> Result<Self> {
        if unit_price <= Decimal::ZERO {
            return Err(TransactionError::InvalidPrice(unit_price));
        }
        Ok(Self::purchase(account_id, amount / unit_price, unit_price, date))
    }

    pub fn sale(account_id: &str, quantity: Decimal, unit_price: Decimal, date: NaiveDate) -> Self {
        NewTransaction {
            account_id: account_id.to_string(),
            kind: TransactionKind::Sale,
            quantity,
            unit_price,
            date,
        }
    }

    /// Validates the draft before any fee or basis math is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(TransactionError::InvalidQuantity(self.quantity));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(TransactionError::InvalidPrice(self.unit_price));
        }
        Ok(())
    }

    /// Unsigned notional of the draft.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Wire format for bulk import. Accepts both snapshots exported by this
/// crate and the older app's JSON, which used `bank`/`weight`/`price`/
/// `amount` field names and predates the frozen `realizedPnl` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(alias = "bank")]
    pub account_id: String,
    /// Signed, as exported.
    #[serde(alias = "weight")]
    pub quantity: Decimal,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    #[serde(alias = "amount")]
    pub notional: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub date: NaiveDate,
    #[serde(default, alias = "realizedProfitLoss")]
    pub realized_pnl: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Export envelope, matching the shape the original server handed out for
/// download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub export_date: DateTime<Utc>,
    pub count: usize,
    pub transactions: Vec<Transaction>,
}
