//! Personal ledger of debts and loans: who owes whom how much.
//!
//! [`Ledger`] holds the transactions in memory, derives a [`Summary`] on
//! every read and mirrors the whole collection to a [`Storage`] backend
//! after each change.

mod csv_utils;
mod dto;
mod error;
mod ledger;
mod money;
mod runner;
mod settings;
mod storage;
mod stores;
mod summary;

pub use csv_utils::write_csv;
pub use dto::{parse_amount, parse_date, Transaction, TransactionRow, TransactionType, MAX_AMOUNT};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use money::{format_amount, DEFAULT_CURRENCY_SYMBOL};
pub use runner::{run, Command};
pub use settings::Settings;
pub use storage::{FileStorage, MemoryStorage, Storage, STORAGE_KEY};
pub use summary::Summary;
