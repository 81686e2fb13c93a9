//! Balance totals derived from the current collection.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::error;

use crate::dto::{Transaction, TransactionType};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Outstanding amount I owe.
    pub total_debt: Decimal,
    /// Outstanding amount owed to me.
    pub total_lent: Decimal,
    /// `total_lent - total_debt`; positive means net creditor.
    pub net_balance: Decimal,
    pub active_count: usize,
    pub settled_count: usize,
}

impl Summary {
    /// Computes totals over `transactions`. Settled records only count
    /// towards `settled_count`. Totals that would leave `Decimal` range
    /// saturate instead of panicking.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut summary = Summary::default();
        for transaction in transactions {
            if transaction.settled {
                summary.settled_count += 1;
                continue;
            }
            summary.active_count += 1;
            let total = match transaction.tx_type {
                TransactionType::Debt => &mut summary.total_debt,
                TransactionType::Lent => &mut summary.total_lent,
            };
            *total = total.checked_add(transaction.amount).unwrap_or_else(|| {
                error!(id = %transaction.id, "{} total overflowed, saturating", transaction.tx_type);
                Decimal::MAX
            });
        }
        summary.net_balance = summary
            .total_lent
            .checked_sub(summary.total_debt)
            .unwrap_or_else(|| {
                error!("Net balance overflowed, saturating");
                Decimal::MIN
            });
        summary
    }
}
