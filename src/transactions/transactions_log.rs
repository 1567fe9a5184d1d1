use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::Transaction;

/// Append-only, insertion-ordered transaction log. Entries may be deleted
/// by id but are never edited in place; all derived state is recomputed
/// from the surviving entries.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        TransactionLog::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    /// Removes and returns the entry with the given id. The frozen values
    /// of every other entry are untouched.
    pub fn delete(&mut self, id: &str) -> Result<Transaction> {
        let index = self
            .entries
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TransactionError::NotFound(id.to_string()))?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.entries.iter().find(|t| t.id == id)
    }

    /// Entries in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }
}
