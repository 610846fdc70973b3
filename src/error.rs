//! Error types for the cashd crate.
//!
//! Most functions return `crate::Result`, an `anyhow` result. Domain failures
//! that callers need to distinguish (bad user input, missing rows, a restore
//! candidate that is not a database) are raised as `LedgerError` and travel
//! inside the `anyhow::Error`, where they can be recovered with
//! `Error::downcast_ref`.

use std::path::PathBuf;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Domain errors surfaced to the user. Everything else (file I/O, SQL) is
/// wrapped with `anyhow::Context` at the call site.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A form field or currency amount failed validation. Recovered locally;
    /// the enclosing operation performs no writes.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation referenced a customer or transaction id that does not
    /// exist. Treated as caller error, never silently ignored.
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },

    /// A backup restore candidate is not a well-formed cashd database. The
    /// live database is never touched when this is raised.
    #[error("'{}' is not a valid cashd database file", .0.display())]
    InvalidFormat(PathBuf),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Error {
        LedgerError::Validation(msg.into()).into()
    }

    pub fn not_found(entity: &'static str, id: i64) -> Error {
        LedgerError::NotFound { entity, id }.into()
    }
}
