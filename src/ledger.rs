use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dto::{Transaction, TransactionType};
use crate::error::{Error, Result};
use crate::storage::{Storage, STORAGE_KEY};
use crate::stores::TransactionsStore;
use crate::summary::Summary;

/// Transaction store for one user's debts and loans.
///
/// The in-memory collection is the source of truth. Every mutation spawns a
/// write of the full serialized collection to `S` and returns without
/// waiting for it; [`Ledger::flush`] waits for outstanding writes.
/// Validation and storage failures are logged, never returned from the
/// mutation and read methods.
pub struct Ledger<S: Storage> {
    storage: Arc<S>,
    transactions: TransactionsStore,
    runtime: Handle,
    /// Generation of the most recently issued snapshot
    generation: u64,
    /// Generation of the newest snapshot a write was attempted for
    attempted: Arc<Mutex<u64>>,
    pending: JoinSet<Result<()>>,
    /// First failure among writes reaped before the next flush
    write_error: Option<Error>,
}

impl<S: Storage> Ledger<S> {
    /// Loads the persisted collection from `storage`. A missing blob yields an
    /// empty ledger, as does an unreadable or malformed one (after logging).
    ///
    /// # Panics
    /// Must be awaited from within a Tokio runtime, which is where persist
    /// writes are spawned.
    pub async fn load(storage: S) -> Self {
        let storage = Arc::new(storage);
        let transactions = match read_snapshot(storage.as_ref()).await {
            Ok(transactions) => {
                info!("Loaded {} transactions", transactions.len());
                TransactionsStore::from_transactions(transactions)
            }
            Err(err) => {
                error!("Failed to load transactions, starting empty: {}", err);
                TransactionsStore::new()
            }
        };

        Self {
            storage,
            transactions,
            runtime: Handle::current(),
            generation: 0,
            attempted: Arc::new(Mutex::new(0)),
            pending: JoinSet::new(),
            write_error: None,
        }
    }

    /// Records a new transaction and returns it.
    ///
    /// Returns `None` without touching state or storage if `person_name` is
    /// blank or `amount` is not a positive number.
    pub fn add(
        &mut self,
        tx_type: TransactionType,
        person_name: &str,
        amount: &str,
        description: &str,
        date: DateTime<Utc>,
    ) -> Option<Transaction> {
        let transaction =
            match Transaction::new(tx_type, person_name, amount, description, date) {
                Ok(transaction) => transaction,
                Err(err) => {
                    debug!("Declined to add transaction: {}", err);
                    return None;
                }
            };
        if let Err(err) = self.transactions.insert(transaction.clone()) {
            warn!("Declined to add transaction: {}", err);
            return None;
        }
        debug!(id = %transaction.id, "Added {} transaction", transaction.tx_type);
        self.persist();
        Some(transaction)
    }

    /// Flips the settled flag of the matching transaction.
    /// Returns `false` (and writes nothing) if no transaction has this id.
    pub fn toggle_settled(&mut self, id: &str) -> bool {
        match self.transactions.toggle_settled(id) {
            Some(transaction) => debug!(id, settled = transaction.settled, "Toggled transaction"),
            None => {
                debug!(id, "No transaction to toggle");
                return false;
            }
        }
        self.persist();
        true
    }

    /// Removes the matching transaction.
    /// Returns `false` (and writes nothing) if no transaction has this id.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.transactions.remove(id).is_none() {
            debug!(id, "No transaction to delete");
            return false;
        }
        debug!(id, "Deleted transaction");
        self.persist();
        true
    }

    /// Totals recomputed from the current collection.
    pub fn summary(&self) -> Summary {
        Summary::from_transactions(self.transactions.iter())
    }

    /// Unsettled transactions, most recently created first.
    pub fn active_transactions(&self) -> Vec<&Transaction> {
        self.transactions.active()
    }

    /// Settled transactions, most recently created first.
    pub fn settled_transactions(&self) -> Vec<&Transaction> {
        self.transactions.settled()
    }

    /// All transactions in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    /// Number of transactions, settled or not.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the ledger holds no transactions at all.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Looks up a transaction by id.
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    /// The backing storage the ledger persists to.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Waits for every in-flight write to finish.
    /// Returns the first write failure seen since the previous flush, if any.
    pub async fn flush(&mut self) -> Result<()> {
        let mut first_error = self.write_error.take();
        while let Some(joined) = self.pending.join_next().await {
            if let Err(err) = joined.map_err(Error::from).and_then(|result| result) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Spawns a write of the whole collection as it is right now.
    fn persist(&mut self) {
        self.reap_finished_writes();

        let snapshot = match serde_json::to_string(self.transactions.as_slice()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!("Failed to serialize transactions: {}", err);
                return;
            }
        };
        self.generation += 1;
        self.pending.spawn_on(
            write_snapshot(
                Arc::clone(&self.storage),
                Arc::clone(&self.attempted),
                self.generation,
                snapshot,
            ),
            &self.runtime,
        );
    }

    fn reap_finished_writes(&mut self) {
        while let Some(joined) = self.pending.try_join_next() {
            if let Err(err) = joined.map_err(Error::from).and_then(|result| result) {
                self.write_error.get_or_insert(err);
            }
        }
    }
}

impl<S: Storage> Drop for Ledger<S> {
    fn drop(&mut self) {
        // Dropping a JoinSet aborts its tasks; writes must outlive the ledger
        if !self.pending.is_empty() {
            debug!("Detaching {} in-flight writes", self.pending.len());
            self.pending.detach_all();
        }
    }
}

/// Reads and deserializes the persisted collection. A missing blob is an
/// empty collection.
pub(crate) async fn read_snapshot<S: Storage>(storage: &S) -> Result<Vec<Transaction>> {
    match storage.get(STORAGE_KEY).await? {
        Some(blob) => Ok(serde_json::from_str(&blob)?),
        None => Ok(Vec::new()),
    }
}

/// Writes one snapshot. Writes are serialized through `attempted`, and a
/// snapshot older than the newest one already attempted is skipped, even if
/// that attempt failed. Storage therefore never moves back to an older state.
async fn write_snapshot<S: Storage>(
    storage: Arc<S>,
    attempted: Arc<Mutex<u64>>,
    generation: u64,
    snapshot: String,
) -> Result<()> {
    let mut attempted = attempted.lock().await;
    if *attempted > generation {
        debug!(generation, attempted = *attempted, "Skipping stale snapshot");
        return Ok(());
    }
    *attempted = generation;
    storage.set(STORAGE_KEY, snapshot).await.map_err(|err| {
        error!(generation, "Failed to persist transactions: {}", err);
        err
    })
}
