//! The transaction row type.

use crate::model::Amount;
use crate::source::SearchableRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `transacoes` table. Every transaction belongs to exactly
/// one customer; a positive amount increases the customer's debt and a
/// negative one decreases it. Rows are created and deleted, never updated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    #[sqlx(rename = "Id")]
    pub id: i64,
    #[sqlx(rename = "IdCliente")]
    pub customer_id: i64,
    /// When the row was created. Audit only, not shown on the ledger.
    #[sqlx(rename = "CarimboTempo")]
    pub created_at: DateTime<Utc>,
    /// The user-supplied date the debt or payment occurred.
    #[sqlx(rename = "DataTransac")]
    pub date: NaiveDate,
    /// Signed amount in cents.
    #[sqlx(rename = "Valor")]
    pub cents: i64,
}

impl Transaction {
    pub fn amount(&self) -> Amount {
        Amount::from_cents(self.cents)
    }

    /// One-line ledger rendering, e.g. `14/02/2026 | -5,50`.
    pub fn display_line(&self) -> String {
        format!("{} | {}", self.date.format("%d/%m/%Y"), self.amount())
    }
}

impl SearchableRow for Transaction {
    fn search_text(&self) -> String {
        self.display_line()
    }
}
