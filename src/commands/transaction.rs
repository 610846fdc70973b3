//! Transaction commands: insert, delete and list.

use crate::args::{ListArgs, TxInsertArgs};
use crate::commands::{render_page, Out};
use crate::error::LedgerError;
use crate::model::{AmountStatus, Transaction};
use crate::{Config, Ledger, Result};
use chrono::Local;

/// Parses the amount, validates it and stores a transaction. The date
/// defaults to today when not given.
pub async fn tx_insert(config: Config, args: &TxInsertArgs) -> Result<Out<Transaction>> {
    let parsed = crate::model::Amount::parse(args.amount());
    match parsed.status() {
        AmountStatus::Valid => {}
        AmountStatus::Empty => {
            return Err(LedgerError::validation("no amount was given"));
        }
        AmountStatus::Invalid => {
            return Err(LedgerError::validation(format!(
                "'{}' is not a valid amount; write it like 120,50 or -80",
                args.amount()
            )));
        }
    }

    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    let ledger = Ledger::new(&config);
    let transaction = ledger
        .create_transaction(args.customer_id(), date, parsed.amount())
        .await?;
    let customer = ledger.customer(transaction.customer_id).await?;

    let verb = if transaction.cents > 0 {
        "purchase"
    } else {
        "payment"
    };
    Ok(Out::new(
        format!(
            "Recorded {} of {} for {} on {}",
            verb,
            transaction.amount(),
            customer.display_label(),
            transaction.date.format("%d/%m/%Y")
        ),
        transaction,
    ))
}

/// Deletes a transaction and reports the removed row.
pub async fn tx_delete(config: Config, id: i64) -> Result<Out<Transaction>> {
    let deleted = Ledger::new(&config).delete_transaction(id).await?;
    Ok(Out::new(
        format!(
            "Deleted transaction {} ({}) of customer {}",
            deleted.id,
            deleted.display_line(),
            deleted.customer_id
        ),
        deleted,
    ))
}

/// Lists a customer's transactions, most recent date first.
pub async fn tx_list(
    config: Config,
    customer_id: i64,
    list: &ListArgs,
) -> Result<Out<Vec<Transaction>>> {
    let source = Ledger::new(&config).transactions(customer_id).await?;
    Ok(render_page(source, list, |t| {
        format!("{:>4}  {}", t.id, t.display_line())
    }))
}
