pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
mod ledger;
pub mod model;
mod source;
mod utils;

pub use backup::{Backup, BackupOutcome, BackupState};
pub use config::Config;
pub use db::Db;
pub use error::Error;
pub use error::LedgerError;
pub use error::Result;
pub use ledger::Ledger;
pub use source::{matches_search, BalanceSource, PageSource, SearchableRow};
