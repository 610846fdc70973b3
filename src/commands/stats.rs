//! Statistics commands: the four aggregate tables.

use crate::args::ListArgs;
use crate::commands::{render_page, Out};
use crate::model::{
    DateGrouping, DebtorBalance, InactiveCustomer, PeriodBalance, RecentTransaction,
};
use crate::{Config, Ledger, Result};

/// Transaction totals bucketed by period, most recent bucket first, with a
/// running total accumulated from the oldest bucket.
pub async fn stats_balance(
    config: Config,
    group_by: DateGrouping,
    list: &ListArgs,
) -> Result<Out<Vec<PeriodBalance>>> {
    let source = Ledger::new(&config).period_balances(group_by).await?;
    Ok(render_page(source.into_pages(), list, |b| {
        format!(
            "{:<10}  purchases {:>12}  payments {:>12}  total {:>12}",
            b.period, b.purchases, b.reductions, b.running_total
        )
    }))
}

/// Customers by owed balance, highest first.
pub async fn stats_highest(config: Config, list: &ListArgs) -> Result<Out<Vec<DebtorBalance>>> {
    let source = Ledger::new(&config).highest_balances().await?;
    Ok(render_page(source, list, |b| {
        format!("{:>4}  {:<30}  {:>12}", b.customer_id, b.name, b.balance())
    }))
}

/// Customers by most recent transaction date, oldest first. Customers with
/// no transactions are not listed.
pub async fn stats_inactive(config: Config, list: &ListArgs) -> Result<Out<Vec<InactiveCustomer>>> {
    let source = Ledger::new(&config).inactive_customers().await?;
    Ok(render_page(source, list, |c| {
        format!(
            "{:>4}  {:<30}  last seen {}  owes {:>12}",
            c.customer_id,
            c.name,
            c.last_transaction.format("%d/%m/%Y"),
            c.balance()
        )
    }))
}

/// Most recently entered transactions first.
pub async fn stats_recent(config: Config, list: &ListArgs) -> Result<Out<Vec<RecentTransaction>>> {
    let source = Ledger::new(&config).recent_transactions().await?;
    Ok(render_page(source, list, |t| {
        format!(
            "{}  {:<30}  {:>12}",
            t.date.format("%d/%m/%Y"),
            t.name,
            t.amount()
        )
    }))
}
