//! This module is responsible for reading, writing and managing the SQLite
//! database.

mod migrations;

use crate::error::LedgerError;
use crate::model::{
    Customer, CustomerForm, DebtorBalance, InactiveCustomer, RecentTransaction, Transaction,
};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// The schema version this build expects. `load` migrates older files up to
/// this version before returning.
const TARGET_SCHEMA_VERSION: i32 = 1;

/// Handle to the SQLite database holding the `clientes` and `transacoes`
/// tables. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema at the current version
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, TARGET_SCHEMA_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Runs migrations if the schema is out-of-date
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("No database file found at '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        let current = schema_version(&pool).await?;
        migrations::run(&pool, current, TARGET_SCHEMA_VERSION).await?;
        Ok(Self { pool })
    }

    /// Structural check used before restoring a backup over the live file.
    /// Opens `path` read-only and confirms it is a SQLite database carrying
    /// the expected tables. Fails with `LedgerError::InvalidFormat`.
    pub async fn validate(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let invalid = || LedgerError::InvalidFormat(path.to_path_buf());

        if !path.is_file() {
            return Err(invalid().into());
        }
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Failed to parse SQLite connection string")?
            .read_only(true);
        let pool = match SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
        {
            Ok(pool) => pool,
            Err(_) => return Err(invalid().into()),
        };

        let count: std::result::Result<(i32,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('clientes', 'transacoes')",
        )
        .fetch_one(&pool)
        .await;
        pool.close().await;

        match count {
            Ok((2,)) => Ok(()),
            _ => Err(invalid().into()),
        }
    }

    /// Inserts a customer from an already-normalized form and returns the
    /// stored row.
    pub async fn insert_customer(&self, form: &CustomerForm) -> Result<Customer> {
        let result = sqlx::query(
            "INSERT INTO clientes \
             (PrimeiroNome, Sobrenome, Apelido, Telefone, Cidade, Bairro, Endereco, Estado) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(&form.nickname)
        .bind(&form.phone)
        .bind(&form.city)
        .bind(&form.neighborhood)
        .bind(&form.address)
        .bind(&form.state)
        .execute(&self.pool)
        .await
        .context("Failed to insert customer")?;

        let id = result.last_insert_rowid();
        self.customer_by_id(id)
            .await?
            .context("Inserted customer row not found")
    }

    /// Overwrites every editable column of customer `id`.
    pub async fn update_customer(&self, id: i64, form: &CustomerForm) -> Result<()> {
        let result = sqlx::query(
            "UPDATE clientes SET PrimeiroNome = ?, Sobrenome = ?, Apelido = ?, Telefone = ?, \
             Cidade = ?, Bairro = ?, Endereco = ?, Estado = ? WHERE Id = ?",
        )
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(&form.nickname)
        .bind(&form.phone)
        .bind(&form.city)
        .bind(&form.neighborhood)
        .bind(&form.address)
        .bind(&form.state)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update customer")?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("customer", id));
        }
        Ok(())
    }

    pub async fn customer_by_id(&self, id: i64) -> Result<Option<Customer>> {
        sqlx::query_as("SELECT * FROM clientes WHERE Id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query customer")
    }

    /// All customers in id order.
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        sqlx::query_as("SELECT * FROM clientes ORDER BY Id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list customers")
    }

    /// Inserts a transaction row and returns it. The caller validates the
    /// amount and the customer's existence first.
    pub async fn insert_transaction(
        &self,
        customer_id: i64,
        date: NaiveDate,
        cents: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction> {
        let result = sqlx::query(
            "INSERT INTO transacoes (IdCliente, CarimboTempo, DataTransac, Valor) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(created_at)
        .bind(date)
        .bind(cents)
        .execute(&self.pool)
        .await
        .context("Failed to insert transaction")?;

        let id = result.last_insert_rowid();
        self.transaction_by_id(id)
            .await?
            .context("Inserted transaction row not found")
    }

    pub async fn transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        sqlx::query_as("SELECT * FROM transacoes WHERE Id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query transaction")
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM transacoes WHERE Id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("transaction", id));
        }
        Ok(())
    }

    /// The customer's owed balance in cents, recomputed from their
    /// transaction rows. Zero when there are none.
    pub async fn customer_balance(&self, customer_id: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(Valor), 0) FROM transacoes WHERE IdCliente = ?",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute customer balance")?;
        Ok(row.0)
    }

    /// A customer's transactions, most recent date first.
    pub async fn transactions_for_customer(&self, customer_id: i64) -> Result<Vec<Transaction>> {
        sqlx::query_as(
            "SELECT * FROM transacoes WHERE IdCliente = ? ORDER BY DataTransac DESC, Id DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")
    }

    /// Every transaction's (date, cents) pair in chronological order, the raw
    /// input of the period-balance aggregation.
    pub async fn transaction_amounts_by_date(&self) -> Result<Vec<(NaiveDate, i64)>> {
        sqlx::query_as("SELECT DataTransac, Valor FROM transacoes ORDER BY DataTransac, Id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query transaction amounts")
    }

    /// Customers ordered by owed balance, highest first. Customers with no
    /// transactions appear with a zero balance.
    pub async fn highest_balances(&self) -> Result<Vec<DebtorBalance>> {
        sqlx::query_as(
            "SELECT c.Id AS Id, c.PrimeiroNome || ' ' || c.Sobrenome AS Nome, \
                    COALESCE(SUM(t.Valor), 0) AS Saldo \
             FROM clientes c LEFT JOIN transacoes t ON t.IdCliente = c.Id \
             GROUP BY c.Id ORDER BY Saldo DESC, c.Id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query balances")
    }

    /// Customers by the date of their most recent transaction, oldest first.
    /// Customers with no transactions at all are excluded.
    pub async fn inactive_customers(&self) -> Result<Vec<InactiveCustomer>> {
        sqlx::query_as(
            "SELECT c.Id AS Id, c.PrimeiroNome || ' ' || c.Sobrenome AS Nome, \
                    MAX(t.DataTransac) AS UltimaTransac, COALESCE(SUM(t.Valor), 0) AS Saldo \
             FROM clientes c INNER JOIN transacoes t ON t.IdCliente = c.Id \
             GROUP BY c.Id ORDER BY UltimaTransac ASC, c.Id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query inactive customers")
    }

    /// Most recently entered transactions first, joined with the customer
    /// name.
    pub async fn recent_transactions(&self) -> Result<Vec<RecentTransaction>> {
        sqlx::query_as(
            "SELECT t.DataTransac AS DataTransac, t.IdCliente AS IdCliente, \
                    c.PrimeiroNome || ' ' || c.Sobrenome AS Nome, t.Valor AS Valor \
             FROM transacoes t INNER JOIN clientes c ON c.Id = t.IdCliente \
             ORDER BY t.Id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query recent transactions")
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at '{}'", path.display()))
}

async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0)
}
