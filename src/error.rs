//! Errors for the debt ledger.
//!
//! Contains error variants for:
//! - Input validation (blank person name, non-numeric or non-positive amount)
//! - Collection integrity (duplicate transaction ids)
//! - Persistence and I/O (storage reads/writes, malformed blobs, CSV export)
//!
//! The [`Ledger`](crate::Ledger) never surfaces these to its callers: validation
//! errors decline the operation and storage errors are logged. They are
//! returned by the lower-level helpers, the settings loader and the CLI runner.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("person name must not be empty")]
    EmptyPersonName,

    #[error("amount {0:?} is not a number")]
    InvalidAmount(String),

    #[error("amount must be positive")]
    AmountMustBePositive,

    #[error("amount must not exceed {0}")]
    AmountTooLarge(rust_decimal::Decimal),

    #[error("unknown transaction type {0:?}, expected \"debt\" or \"lent\"")]
    UnknownTransactionType(String),

    #[error("invalid date {0:?}, expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("duplicate transaction id {0}")]
    DuplicateTransaction(String),

    #[error("I/O error: {0}")]
    Storage(#[from] io::Error),

    #[error("malformed transaction data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("persist task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
