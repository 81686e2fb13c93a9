//! Durable key-value persistence for the ledger.
//!
//! The ledger stores its whole collection as one opaque string blob under
//! [`STORAGE_KEY`]. Any backend implementing [`Storage`] can hold it:
//! - [`MemoryStorage`] keeps blobs in process memory (tests, benches)
//! - [`FileStorage`] keeps one file per key under a data directory

mod file;
mod memory;

use std::future::Future;

use crate::error::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key under which the serialized transaction list is stored.
pub const STORAGE_KEY: &str = "transactions";

/// Asynchronous get/set of string blobs.
///
/// Write futures are spawned onto the runtime by the ledger, so they must be
/// `Send` and the backend itself shareable across tasks.
pub trait Storage: Send + Sync + 'static {
    /// Returns the blob stored under `key`, or `None` if nothing was stored yet.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replaces whatever is stored under `key` with `blob`.
    fn set(&self, key: &str, blob: String) -> impl Future<Output = Result<()>> + Send;
}
