//! The ledger facade.
//!
//! Every data operation of the application goes through `Ledger`: customer
//! and transaction mutations with their validation rules, recomputed
//! balances, and the paginated sources backing the list and statistics
//! surfaces. The facade is stateless; selection and form state belong to the
//! caller.

use crate::config::Config;
use crate::db::Db;
use crate::error::LedgerError;
use crate::model::{
    Amount, Customer, CustomerForm, DateGrouping, DebtorBalance, InactiveCustomer,
    RecentTransaction, Transaction,
};
use crate::source::{BalanceSource, PageSource};
use crate::Result;
use chrono::{NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct Ledger {
    db: Db,
    page_size: usize,
}

impl Ledger {
    pub fn new(config: &Config) -> Self {
        Self {
            db: config.db().clone(),
            page_size: config.page_size(),
        }
    }

    /// Validates the form and stores a new customer. Fails with
    /// `LedgerError::Validation` on a bad field; nothing is stored in that
    /// case.
    pub async fn create_customer(&self, form: &CustomerForm) -> Result<Customer> {
        let normalized = form.normalized()?;
        self.db.insert_customer(&normalized).await
    }

    /// Validates the form and overwrites every field of customer `id`.
    pub async fn update_customer(&self, id: i64, form: &CustomerForm) -> Result<Customer> {
        let normalized = form.normalized()?;
        if self.db.customer_by_id(id).await?.is_none() {
            return Err(LedgerError::not_found("customer", id));
        }
        self.db.update_customer(id, &normalized).await?;
        self.customer(id).await
    }

    pub async fn customer(&self, id: i64) -> Result<Customer> {
        self.db
            .customer_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("customer", id))
    }

    /// The customer's owed balance, recomputed from their transactions.
    pub async fn customer_balance(&self, id: i64) -> Result<Amount> {
        self.customer(id).await?;
        Ok(Amount::from_cents(self.db.customer_balance(id).await?))
    }

    /// Stores a transaction against an existing customer. The amount must be
    /// valid (non-zero, within the ceiling); the creation timestamp is taken
    /// now and the transaction date comes from the caller.
    pub async fn create_transaction(
        &self,
        customer_id: i64,
        date: NaiveDate,
        amount: Amount,
    ) -> Result<Transaction> {
        if !amount.is_valid() {
            return Err(LedgerError::validation(format!(
                "'{amount}' is not a valid transaction amount"
            )));
        }
        self.customer(customer_id).await?;
        self.db
            .insert_transaction(customer_id, date, amount.cents(), Utc::now())
            .await
    }

    /// Deletes a transaction and returns the deleted row.
    pub async fn delete_transaction(&self, id: i64) -> Result<Transaction> {
        let transaction = self
            .db
            .transaction_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("transaction", id))?;
        self.db.delete_transaction(id).await?;
        Ok(transaction)
    }

    /// All customers as a searchable paginated source, in id order.
    pub async fn customers(&self) -> Result<PageSource<Customer>> {
        let rows = self.db.list_customers().await?;
        Ok(PageSource::new(rows, self.page_size))
    }

    /// A customer's transactions, most recent date first.
    pub async fn transactions(&self, customer_id: i64) -> Result<PageSource<Transaction>> {
        self.customer(customer_id).await?;
        let rows = self.db.transactions_for_customer(customer_id).await?;
        Ok(PageSource::new(rows, self.page_size))
    }

    /// Transaction totals bucketed by period, most recent bucket first.
    pub async fn period_balances(&self, grouping: DateGrouping) -> Result<BalanceSource> {
        let amounts = self.db.transaction_amounts_by_date().await?;
        Ok(BalanceSource::new(amounts, grouping, self.page_size))
    }

    /// Customers by owed balance, highest first.
    pub async fn highest_balances(&self) -> Result<PageSource<DebtorBalance>> {
        let rows = self.db.highest_balances().await?;
        Ok(PageSource::new(rows, self.page_size))
    }

    /// Customers by most recent transaction date, oldest first.
    pub async fn inactive_customers(&self) -> Result<PageSource<InactiveCustomer>> {
        let rows = self.db.inactive_customers().await?;
        Ok(PageSource::new(rows, self.page_size))
    }

    /// Most recently entered transactions first.
    pub async fn recent_transactions(&self) -> Result<PageSource<RecentTransaction>> {
        let rows = self.db.recent_transactions().await?;
        Ok(PageSource::new(rows, self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_ledger() -> (TempDir, Ledger) {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path().join("cashd_home")).await.unwrap();
        let ledger = Ledger::new(&config);
        (dir, ledger)
    }

    fn form(first: &str, last: &str) -> CustomerForm {
        CustomerForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            city: "palmares".to_string(),
            state: "pe".to_string(),
            ..CustomerForm::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_customer_normalizes_fields() {
        let (_dir, ledger) = test_ledger().await;
        let customer = ledger.create_customer(&form("ana", "souza")).await.unwrap();
        assert_eq!(customer.first_name, "Ana");
        assert_eq!(customer.last_name, "Souza");
        assert_eq!(customer.state, "PE");
    }

    #[tokio::test]
    async fn test_create_customer_rejects_bad_form() {
        let (_dir, ledger) = test_ledger().await;
        let err = ledger.create_customer(&form("", "souza")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::Validation(_))
        ));
        // Nothing was stored.
        assert_eq!(ledger.customers().await.unwrap().total_row_count(), 0);
    }

    #[tokio::test]
    async fn test_update_customer() {
        let (_dir, ledger) = test_ledger().await;
        let customer = ledger.create_customer(&form("ana", "souza")).await.unwrap();

        let updated = ledger
            .update_customer(customer.id, &form("ana", "silva"))
            .await
            .unwrap();
        assert_eq!(updated.last_name, "Silva");

        let err = ledger
            .update_customer(999, &form("ana", "silva"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_transaction_requires_valid_amount() {
        let (_dir, ledger) = test_ledger().await;
        let customer = ledger.create_customer(&form("ana", "souza")).await.unwrap();

        let err = ledger
            .create_transaction(customer.id, date(2026, 1, 10), Amount::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_transaction_requires_existing_customer() {
        let (_dir, ledger) = test_ledger().await;
        let err = ledger
            .create_transaction(999, date(2026, 1, 10), Amount::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_balance_invariant_over_create_and_delete() {
        let (_dir, ledger) = test_ledger().await;
        let customer = ledger.create_customer(&form("ana", "souza")).await.unwrap();

        let t1 = ledger
            .create_transaction(customer.id, date(2026, 1, 10), Amount::from_cents(1000))
            .await
            .unwrap();
        ledger
            .create_transaction(customer.id, date(2026, 1, 15), Amount::from_cents(-400))
            .await
            .unwrap();
        ledger
            .create_transaction(customer.id, date(2026, 1, 20), Amount::from_cents(250))
            .await
            .unwrap();
        assert_eq!(
            ledger.customer_balance(customer.id).await.unwrap(),
            Amount::from_cents(850)
        );

        let deleted = ledger.delete_transaction(t1.id).await.unwrap();
        assert_eq!(deleted.cents, 1000);
        assert_eq!(
            ledger.customer_balance(customer.id).await.unwrap(),
            Amount::from_cents(-150)
        );

        let remaining: i64 = ledger
            .transactions(customer.id)
            .await
            .unwrap()
            .current_page()
            .iter()
            .map(|t| t.cents)
            .sum();
        assert_eq!(remaining, -150);
    }

    #[tokio::test]
    async fn test_delete_transaction_not_found() {
        let (_dir, ledger) = test_ledger().await;
        let err = ledger.delete_transaction(42).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sources_cover_statistics() {
        let (_dir, ledger) = test_ledger().await;
        let ana = ledger.create_customer(&form("ana", "souza")).await.unwrap();
        let bruno = ledger.create_customer(&form("bruno", "lima")).await.unwrap();
        ledger
            .create_transaction(ana.id, date(2026, 1, 10), Amount::from_cents(500))
            .await
            .unwrap();
        ledger
            .create_transaction(bruno.id, date(2026, 2, 1), Amount::from_cents(900))
            .await
            .unwrap();

        let highest = ledger.highest_balances().await.unwrap();
        assert_eq!(highest.current_page()[0].customer_id, bruno.id);

        let inactive = ledger.inactive_customers().await.unwrap();
        assert_eq!(inactive.current_page()[0].customer_id, ana.id);

        let recent = ledger.recent_transactions().await.unwrap();
        assert_eq!(recent.current_page()[0].customer_id, bruno.id);

        let balances = ledger
            .period_balances(DateGrouping::Monthly)
            .await
            .unwrap();
        let page = balances.current_page();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].period, "2026-02");
        assert_eq!(page[0].running_total.cents(), 1400);
    }

    #[tokio::test]
    async fn test_customer_search_through_source() {
        let (_dir, ledger) = test_ledger().await;
        ledger.create_customer(&form("ana", "silva")).await.unwrap();
        ledger.create_customer(&form("bruno", "souza")).await.unwrap();
        ledger.create_customer(&form("ana", "souza")).await.unwrap();

        let mut customers = ledger.customers().await.unwrap();
        customers.set_search_text("ana souza");
        let page = customers.current_page();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].full_name(), "Ana Souza");
    }
}
