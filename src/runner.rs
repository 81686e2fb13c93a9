use chrono::{DateTime, Utc};
use clap::Subcommand;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::io::Write;

use crate::{
    csv_utils::write_csv,
    dto::{parse_date, Transaction, TransactionRow, TransactionType},
    error::Result,
    money::format_amount,
    storage::Storage,
    Ledger,
};

/// One user action against the ledger.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record money you owe (debt) or are owed (lent)
    Add {
        /// "debt" or "lent"
        tx_type: TransactionType,
        person: String,
        amount: String,
        #[arg(long, short, default_value = "")]
        description: String,
        /// When it happened, RFC 3339 or YYYY-MM-DD (defaults to now)
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// Mark a transaction settled, or active again
    Toggle { id: String },
    /// Remove a transaction
    Delete { id: String },
    /// Show outstanding totals
    Summary,
    /// List active transactions, newest first
    List {
        /// List settled transactions instead
        #[arg(long)]
        settled: bool,
    },
    /// Write all transactions as CSV
    Export,
}

/// Runs `command` against the ledger and writes its output to `writer`.
/// Waits for the resulting writes to reach storage before returning.
///
/// # Errors
/// Returns an error if:
/// * Writing to the output fails
/// * A write to storage failed
pub async fn run<S, W>(
    ledger: &mut Ledger<S>,
    command: Command,
    currency_symbol: &str,
    mut writer: W,
) -> Result<()>
where
    S: Storage,
    W: Write,
{
    match command {
        Command::Add {
            tx_type,
            person,
            amount,
            description,
            date,
        } => {
            let date = date.unwrap_or_else(Utc::now);
            match ledger.add(tx_type, &person, &amount, &description, date) {
                Some(transaction) => writeln!(writer, "Added {}", transaction.id)?,
                None => writeln!(
                    writer,
                    "Nothing added: a person name and a positive amount are required"
                )?,
            }
        }
        Command::Toggle { id } => {
            if ledger.toggle_settled(&id) {
                let settled = ledger.get(&id).is_some_and(|t| t.settled);
                let state = if settled { "settled" } else { "active" };
                writeln!(writer, "Marked {id} as {state}")?;
            } else {
                writeln!(writer, "No transaction with id {id}")?;
            }
        }
        Command::Delete { id } => {
            if ledger.delete(&id) {
                writeln!(writer, "Deleted {id}")?;
            } else {
                writeln!(writer, "No transaction with id {id}")?;
            }
        }
        Command::Summary => write_summary(ledger, currency_symbol, &mut writer)?,
        Command::List { settled } => {
            let transactions = if settled {
                ledger.settled_transactions()
            } else {
                ledger.active_transactions()
            };
            for transaction in transactions {
                writeln!(writer, "{}", list_line(transaction, currency_symbol))?;
            }
        }
        Command::Export => {
            // Active first, then settled, each newest first
            let rows = ledger
                .active_transactions()
                .into_iter()
                .chain(ledger.settled_transactions())
                .map(TransactionRow::from);
            write_csv(&mut writer, rows)?;
        }
    }

    writer.flush()?;
    ledger.flush().await
}

fn write_summary<S: Storage>(
    ledger: &Ledger<S>,
    currency_symbol: &str,
    writer: &mut impl Write,
) -> Result<()> {
    let summary = ledger.summary();
    let standing = match summary.net_balance.cmp(&Decimal::ZERO) {
        Ordering::Greater => " (owed to you)",
        Ordering::Less => " (you owe)",
        Ordering::Equal => "",
    };
    writeln!(writer, "You owe:      {}", format_amount(summary.total_debt, currency_symbol))?;
    writeln!(writer, "Owed to you:  {}", format_amount(summary.total_lent, currency_symbol))?;
    writeln!(
        writer,
        "Net balance:  {}{standing}",
        format_amount(summary.net_balance, currency_symbol)
    )?;
    writeln!(
        writer,
        "Active: {}, settled: {}",
        summary.active_count, summary.settled_count
    )?;
    Ok(())
}

fn list_line(transaction: &Transaction, currency_symbol: &str) -> String {
    let who = match transaction.tx_type {
        TransactionType::Debt => format!("I owe {}", transaction.person_name),
        TransactionType::Lent => format!("{} owes me", transaction.person_name),
    };
    let mut line = format!(
        "{}  {}  {}  {}",
        transaction.id,
        transaction.date.format("%d %b %Y"),
        who,
        format_amount(transaction.amount, currency_symbol),
    );
    if !transaction.description.is_empty() {
        line.push_str("  ");
        line.push_str(&transaction.description);
    }
    line
}
