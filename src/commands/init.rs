use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its contents:
/// - `config.json` with default settings
/// - an empty SQLite database
/// - the `.backups` subdirectory
///
/// # Errors
/// - Returns an error if a database already exists at `cashd_home` or if any
///   file operation fails.
pub async fn init(cashd_home: &Path) -> Result<Out<()>> {
    let config = Config::create(cashd_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the cashd directory at '{}'",
        config.root().display()
    )
    .into())
}
