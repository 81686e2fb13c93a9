//! In-memory state for the ledger. Provides:
//! - The ordered transaction collection ([`TransactionsStore`])
//!
//! Durable persistence lives in [`crate::storage`]; this layer is
//! synchronous, direct memory access only.

mod transactions;

pub use transactions::TransactionsStore;
