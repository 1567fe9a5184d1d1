use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::accounts::AccountRegistry;
use crate::errors::Result;
use crate::portfolio::CostBasisCalculator;

use super::transactions_errors::TransactionError;
use super::transactions_log::TransactionLog;
use super::transactions_model::{
    LedgerSnapshot, NewTransaction, Transaction, TransactionKind, TransactionRecord,
};

/// Service owning the transaction log and the account whitelist. All log
/// mutations go through here so that fees and realized P/L are computed and
/// frozen exactly once, at creation time.
#[derive(Debug, Clone)]
pub struct TransactionService {
    registry: AccountRegistry,
    log: TransactionLog,
}

impl TransactionService {
    pub fn new(registry: AccountRegistry) -> Self {
        TransactionService {
            registry,
            log: TransactionLog::new(),
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    /// Records a purchase. Purchases never carry a fee and lock in no P/L.
    pub fn record_purchase(&mut self, draft: NewTransaction) -> Result<Transaction> {
        if draft.kind != TransactionKind::Purchase {
            return Err(TransactionError::InvalidData(
                "record_purchase called with a sale draft".to_string(),
            )
            .into());
        }
        draft.validate()?;
        self.registry.get(&draft.account_id)?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Purchase,
            account_id: draft.account_id.clone(),
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            notional: draft.notional(),
            fee: Decimal::ZERO,
            date: draft.date,
            realized_pnl: Decimal::ZERO,
            created_at: Utc::now(),
        };

        debug!(
            "Recording purchase of {} g at {} in account {}",
            transaction.quantity, transaction.unit_price, transaction.account_id
        );
        self.log.append(transaction.clone());
        Ok(transaction)
    }

    /// Records a sale. The realized P/L is computed against the account's
    /// cost basis as it stands right now, before this sale enters the log,
    /// and frozen onto the new entry; later log changes never revisit it.
    ///
    /// Selling more than the account holds is rejected before anything is
    /// written, keeping holdings non-negative.
    pub fn record_sale(&mut self, draft: NewTransaction) -> Result<Transaction> {
        if draft.kind != TransactionKind::Sale {
            return Err(TransactionError::InvalidData(
                "record_sale called with a purchase draft".to_string(),
            )
            .into());
        }
        draft.validate()?;
        let account = self.registry.get(&draft.account_id)?;

        let basis = CostBasisCalculator::new().account_basis(
            self.log.transactions(),
            &self.registry,
            &draft.account_id,
        )?;
        if draft.quantity > basis.quantity {
            return Err(TransactionError::InsufficientHoldings {
                account_id: draft.account_id.clone(),
                requested: draft.quantity,
                held: basis.quantity,
            }
            .into());
        }

        let notional = draft.notional();
        let fee = account.fee_policy.sell_fee(draft.quantity, notional);
        let realized_pnl = (draft.unit_price - basis.avg_cost) * draft.quantity - fee;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Sale,
            account_id: draft.account_id.clone(),
            quantity: -draft.quantity,
            unit_price: draft.unit_price,
            notional: -notional,
            fee,
            date: draft.date,
            realized_pnl,
            created_at: Utc::now(),
        };

        debug!(
            "Recording sale of {} g at {} in account {} (fee {}, realized {})",
            draft.quantity, draft.unit_price, draft.account_id, fee, realized_pnl
        );
        self.log.append(transaction.clone());
        Ok(transaction)
    }

    /// Deletes a log entry. Frozen realized P/L values of other entries are
    /// deliberately not recomputed; a deleted sale simply stops contributing
    /// to the totals.
    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        Ok(self.log.delete(id)?)
    }

    /// Bulk-imports records in the given order, normalizing them through the
    /// same sign and fee conventions as organic recording. A sale's frozen
    /// `realizedPnl` is kept verbatim when the record carries one; records
    /// from exports that predate the field fall back to net proceeds
    /// (`|notional| - fee`). Nothing is appended unless every record is
    /// valid.
    pub fn import(&mut self, records: Vec<TransactionRecord>) -> Result<usize> {
        let mut imported = Vec::with_capacity(records.len());
        for record in records {
            imported.push(self.normalize_record(record)?);
        }

        let count = imported.len();
        for transaction in imported {
            self.log.append(transaction);
        }
        debug!("Imported {} transactions", count);
        Ok(count)
    }

    /// Parses and imports a JSON snapshot (this crate's export format or the
    /// original app's).
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        // Parsed as loose records rather than full transactions so that
        // snapshots from before the frozen-P/L era still load.
        #[derive(serde::Deserialize)]
        struct ImportSnapshot {
            transactions: Vec<TransactionRecord>,
        }
        let snapshot: ImportSnapshot = serde_json::from_str(json)?;
        self.import(snapshot.transactions)
    }

    /// Snapshot of the whole log for download/backup.
    pub fn export(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            export_date: Utc::now(),
            count: self.log.len(),
            transactions: self.log.transactions().to_vec(),
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    fn normalize_record(&self, record: TransactionRecord) -> Result<Transaction> {
        let account = self.registry.get(&record.account_id)?;

        let quantity = record.quantity.abs();
        if quantity.is_zero() {
            return Err(TransactionError::InvalidQuantity(record.quantity).into());
        }
        if record.unit_price <= Decimal::ZERO {
            return Err(TransactionError::InvalidPrice(record.unit_price).into());
        }
        let notional = record.notional.abs();

        let fee = record.fee.unwrap_or_else(|| match record.kind {
            TransactionKind::Purchase => Decimal::ZERO,
            TransactionKind::Sale => account.fee_policy.sell_fee(quantity, notional),
        });
        let realized_pnl = match record.kind {
            TransactionKind::Purchase => Decimal::ZERO,
            // Older exports lack the frozen value; net proceeds stand in
            // for it, matching how the original app read such records.
            TransactionKind::Sale => record.realized_pnl.unwrap_or(notional - fee),
        };

        let sign = record.kind.sign();
        Ok(Transaction {
            id: record
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: record.kind,
            account_id: record.account_id,
            quantity: sign * quantity,
            unit_price: record.unit_price,
            notional: sign * notional,
            fee,
            date: record.date,
            realized_pnl,
            created_at: record.created_at.unwrap_or_else(Utc::now),
        })
    }
}
