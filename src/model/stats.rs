//! Row types for the aggregate statistic tables.

use crate::model::Amount;
use crate::source::SearchableRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How transaction dates are bucketed when aggregating balances over time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DateGrouping {
    #[default]
    Monthly,
    Weekly,
    Daily,
}

serde_plain::derive_display_from_serialize!(DateGrouping);
serde_plain::derive_fromstr_from_deserialize!(DateGrouping);

impl DateGrouping {
    /// The strftime format that produces the bucket key for this granularity.
    /// Keys sort chronologically as plain strings.
    pub fn bucket_format(&self) -> &'static str {
        match self {
            DateGrouping::Monthly => "%Y-%m",
            DateGrouping::Weekly => "%Y-%W",
            DateGrouping::Daily => "%Y-%m-%d",
        }
    }
}

/// One time bucket of the balance table: purchases are the sum of positive
/// amounts, reductions the sum of negative amounts, and the running total
/// accumulates the net across buckets from the oldest onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBalance {
    pub period: String,
    pub purchases: Amount,
    pub reductions: Amount,
    pub net: Amount,
    pub running_total: Amount,
}

impl SearchableRow for PeriodBalance {
    fn search_text(&self) -> String {
        self.period.clone()
    }
}

/// A customer and their current owed balance, for the "highest balances"
/// table (balance descending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DebtorBalance {
    #[sqlx(rename = "Id")]
    pub customer_id: i64,
    #[sqlx(rename = "Nome")]
    pub name: String,
    #[sqlx(rename = "Saldo")]
    pub balance_cents: i64,
}

impl DebtorBalance {
    pub fn balance(&self) -> Amount {
        Amount::from_cents(self.balance_cents)
    }
}

impl SearchableRow for DebtorBalance {
    fn search_text(&self) -> String {
        self.name.clone()
    }
}

/// A customer and the date of their most recent transaction, for the
/// "inactive customers" table (oldest first). Customers with no transactions
/// at all are not listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InactiveCustomer {
    #[sqlx(rename = "Id")]
    pub customer_id: i64,
    #[sqlx(rename = "Nome")]
    pub name: String,
    #[sqlx(rename = "UltimaTransac")]
    pub last_transaction: NaiveDate,
    #[sqlx(rename = "Saldo")]
    pub balance_cents: i64,
}

impl InactiveCustomer {
    pub fn balance(&self) -> Amount {
        Amount::from_cents(self.balance_cents)
    }
}

impl SearchableRow for InactiveCustomer {
    fn search_text(&self) -> String {
        self.name.clone()
    }
}

/// One row of the recent-transactions table, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecentTransaction {
    #[sqlx(rename = "DataTransac")]
    pub date: NaiveDate,
    #[sqlx(rename = "IdCliente")]
    pub customer_id: i64,
    #[sqlx(rename = "Nome")]
    pub name: String,
    #[sqlx(rename = "Valor")]
    pub cents: i64,
}

impl RecentTransaction {
    pub fn amount(&self) -> Amount {
        Amount::from_cents(self.cents)
    }
}

impl SearchableRow for RecentTransaction {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.date.format("%d/%m/%Y"))
    }
}
