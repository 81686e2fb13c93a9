//! In-memory transaction collection.
//!
//! Keeps records in insertion order and provides:
//! - Duplicate id prevention
//! - Copy-on-write settling and removal by id
//! - Recency-ordered views of active and settled records

use tracing::warn;

use crate::dto::Transaction;
use crate::error::{Error, Result};

#[derive(Debug, Default, Clone)]
pub struct TransactionsStore {
    /// Insertion order is kept so that equal `created_at` values list stably
    transactions: Vec<Transaction>,
}

impl TransactionsStore {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Builds a store from a loaded snapshot. Records that fail validation,
    /// or whose id was already seen, are dropped, keeping the first occurrence.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut store = Self::new();
        for transaction in transactions {
            if let Err(err) = transaction.validate() {
                warn!(id = %transaction.id, "Dropping invalid record from loaded data: {}", err);
                continue;
            }
            if let Err(err) = store.insert(transaction) {
                warn!("Dropping record from loaded data: {}", err);
            }
        }
        store
    }

    /// Appends a new transaction.
    /// Returns an error if a transaction with the same id already exists.
    pub fn insert(&mut self, transaction: Transaction) -> Result<()> {
        if self.get(&transaction.id).is_some() {
            return Err(Error::DuplicateTransaction(transaction.id));
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Replaces the matching record with a copy whose settled flag is flipped.
    /// Returns the updated record, or `None` if no record has this id.
    pub fn toggle_settled(&mut self, id: &str) -> Option<&Transaction> {
        let index = self.transactions.iter().position(|t| t.id == id)?;
        self.transactions[index] = self.transactions[index].toggled();
        Some(&self.transactions[index])
    }

    /// Removes the matching record, preserving the order of the others.
    pub fn remove(&mut self, id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Unsettled records, most recently created first.
    pub fn active(&self) -> Vec<&Transaction> {
        self.newest_first(|t| !t.settled)
    }

    /// Settled records, most recently created first.
    pub fn settled(&self) -> Vec<&Transaction> {
        self.newest_first(|t| t.settled)
    }

    fn newest_first(&self, filter: impl Fn(&Transaction) -> bool) -> Vec<&Transaction> {
        let mut selected: Vec<_> = self.transactions.iter().filter(|t| filter(t)).collect();
        // Stable: ties keep insertion order
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}
