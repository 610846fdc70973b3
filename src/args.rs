//! These structs provide the CLI interface for the cashd CLI.

use crate::model::DateGrouping;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// cashd: A command-line cash ledger for small businesses that sell on
/// informal credit.
///
/// Customers and their transactions are stored in a local SQLite database.
/// A positive amount records a purchase on credit (the customer owes more), a
/// negative amount records a payment. Balances are always recomputed from the
/// transactions, never stored.
///
/// Amounts are written with a comma as the decimal separator, e.g. `1234,56`
/// or `-50,5`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty
    /// database.
    ///
    /// This is the first command you should run. Decide what directory you
    /// want to store data in and pass it as --cashd-home (or CASHD_HOME). By
    /// default it will be $HOME/cashd.
    Init,
    /// Create, edit and list customers.
    Customer(CustomerArgs),
    /// Insert, delete and list transactions.
    Tx(TxArgs),
    /// Aggregate statistics over the ledger.
    Stats(StatsArgs),
    /// Back up the database file, restore from a copy and manage backup
    /// places.
    Backup(BackupArgs),
    /// Show and change preferences.
    Prefs(PrefsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where cashd data and configuration is held. Defaults to
    /// ~/cashd
    #[arg(long, env = "CASHD_HOME", default_value_t = default_cashd_home())]
    cashd_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cashd_home: PathBuf) -> Self {
        Self {
            log_level,
            cashd_home: cashd_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashd_home(&self) -> &DisplayPath {
        &self.cashd_home
    }
}

#[derive(Debug, Parser, Clone)]
pub struct CustomerArgs {
    #[command(subcommand)]
    entity: CustomerSubcommand,
}

impl CustomerArgs {
    pub fn entity(&self) -> &CustomerSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CustomerSubcommand {
    /// Create a customer.
    Add(CustomerFieldArgs),
    /// Overwrite a customer's fields.
    Edit(CustomerEditArgs),
    /// List customers, optionally filtered and paged.
    List(ListArgs),
    /// Show one customer with their balance and transactions.
    Show(CustomerShowArgs),
}

/// The customer form fields. City and state fall back to the configured
/// defaults when omitted.
#[derive(Debug, Parser, Clone)]
pub struct CustomerFieldArgs {
    /// First name (required, proper-cased on save).
    #[arg(long)]
    first_name: String,

    /// Last name (required, proper-cased on save).
    #[arg(long)]
    last_name: String,

    /// Nickname, used to disambiguate customers with the same name.
    #[arg(long, default_value = "")]
    nickname: String,

    /// Telephone number.
    #[arg(long, default_value = "")]
    phone: String,

    /// City. Defaults to the configured default city.
    #[arg(long)]
    city: Option<String>,

    /// Neighborhood.
    #[arg(long, default_value = "")]
    neighborhood: String,

    /// Street address.
    #[arg(long, default_value = "")]
    address: String,

    /// Two-letter state code, e.g. PE. Defaults to the configured default
    /// state.
    #[arg(long)]
    state: Option<String>,
}

impl CustomerFieldArgs {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct CustomerEditArgs {
    /// The id of the customer to edit.
    id: i64,

    #[clap(flatten)]
    fields: CustomerFieldArgs,
}

impl CustomerEditArgs {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn fields(&self) -> &CustomerFieldArgs {
        &self.fields
    }
}

#[derive(Debug, Parser, Clone)]
pub struct CustomerShowArgs {
    /// The id of the customer to show.
    id: i64,
}

impl CustomerShowArgs {
    pub fn id(&self) -> i64 {
        self.id
    }
}

/// Search and pagination options shared by the list commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Free-text filter. Every whitespace-separated token must match.
    #[arg(long, default_value = "")]
    search: String,

    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    page: usize,
}

impl ListArgs {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }
}

#[derive(Debug, Parser, Clone)]
pub struct TxArgs {
    #[command(subcommand)]
    entity: TxSubcommand,
}

impl TxArgs {
    pub fn entity(&self) -> &TxSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxSubcommand {
    /// Record a transaction for a customer.
    Insert(TxInsertArgs),
    /// Delete a transaction by id.
    Delete(TxDeleteArgs),
    /// List a customer's transactions, most recent first.
    List(TxListArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TxInsertArgs {
    /// The id of the customer.
    customer_id: i64,

    /// The amount, comma as decimal separator. Positive for a purchase,
    /// negative for a payment, e.g. `120,50` or `-80`.
    amount: String,

    /// The date the purchase or payment occurred, YYYY-MM-DD. Defaults to
    /// today.
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
}

impl TxInsertArgs {
    pub fn customer_id(&self) -> i64 {
        self.customer_id
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> Option<chrono::NaiveDate> {
        self.date
    }
}

#[derive(Debug, Parser, Clone)]
pub struct TxDeleteArgs {
    /// The id of the transaction to delete.
    id: i64,
}

impl TxDeleteArgs {
    pub fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Parser, Clone)]
pub struct TxListArgs {
    /// The id of the customer whose transactions to list.
    customer_id: i64,

    #[clap(flatten)]
    list: ListArgs,
}

impl TxListArgs {
    pub fn customer_id(&self) -> i64 {
        self.customer_id
    }

    pub fn list(&self) -> &ListArgs {
        &self.list
    }
}

#[derive(Debug, Parser, Clone)]
pub struct StatsArgs {
    #[command(subcommand)]
    table: StatsSubcommand,
}

impl StatsArgs {
    pub fn table(&self) -> &StatsSubcommand {
        &self.table
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum StatsSubcommand {
    /// Transaction totals bucketed by period with a running total.
    Balance(BalanceStatsArgs),
    /// Customers by owed balance, highest first.
    Highest(ListArgs),
    /// Customers by most recent transaction date, oldest first.
    Inactive(ListArgs),
    /// Most recently entered transactions.
    Recent(ListArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct BalanceStatsArgs {
    /// The bucketing granularity.
    #[arg(long, value_enum, default_value_t = DateGrouping::Monthly)]
    group_by: DateGrouping,

    #[clap(flatten)]
    list: ListArgs,
}

impl BalanceStatsArgs {
    pub fn group_by(&self) -> DateGrouping {
        self.group_by
    }

    pub fn list(&self) -> &ListArgs {
        &self.list
    }
}

#[derive(Debug, Parser, Clone)]
pub struct BackupArgs {
    #[command(subcommand)]
    action: BackupSubcommand,
}

impl BackupArgs {
    pub fn action(&self) -> &BackupSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackupSubcommand {
    /// Copy the database to the local backups directory and every configured
    /// backup place.
    Run(BackupRunArgs),
    /// Replace the live database with a backup copy.
    Restore(BackupRestoreArgs),
    /// List, add or remove backup places.
    Places(PlacesArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct BackupRunArgs {
    /// Copy even if the database file size has not changed since the last
    /// backup.
    #[arg(long)]
    force: bool,
}

impl BackupRunArgs {
    pub fn force(&self) -> bool {
        self.force
    }
}

#[derive(Debug, Parser, Clone)]
pub struct BackupRestoreArgs {
    /// The backup file to restore from. It is validated before the live
    /// database is touched.
    file: PathBuf,
}

impl BackupRestoreArgs {
    pub fn file(&self) -> &Path {
        &self.file
    }
}

#[derive(Debug, Parser, Clone)]
pub struct PlacesArgs {
    #[command(subcommand)]
    action: Option<PlacesSubcommand>,
}

impl PlacesArgs {
    pub fn action(&self) -> Option<&PlacesSubcommand> {
        self.action.as_ref()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlacesSubcommand {
    /// Add a directory that receives backup copies.
    Add(PlaceArgs),
    /// Remove a backup place.
    Remove(PlaceArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct PlaceArgs {
    /// The directory path.
    path: PathBuf,
}

impl PlaceArgs {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Parser, Clone)]
pub struct PrefsArgs {
    #[command(subcommand)]
    action: PrefsSubcommand,
}

impl PrefsArgs {
    pub fn action(&self) -> &PrefsSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PrefsSubcommand {
    /// Print the current preferences.
    Show,
    /// Change one or more preferences.
    Set(PrefsSetArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct PrefsSetArgs {
    /// Default two-letter state code for new customers.
    #[arg(long)]
    state: Option<String>,

    /// Default city for new customers.
    #[arg(long)]
    city: Option<String>,

    /// Rows per page for list commands.
    #[arg(long)]
    page_size: Option<usize>,

    /// Whether a backup run is skipped when the database file size has not
    /// changed.
    #[arg(long)]
    check_file_size: Option<bool>,
}

impl PrefsSetArgs {
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn check_file_size(&self) -> Option<bool> {
        self.check_file_size
    }
}

fn default_cashd_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashd"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashd-home or CASHD_HOME instead of relying on the default \
                cashd home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("cashd")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
