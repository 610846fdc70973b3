//! Backup commands: run, restore and the backup-place list.

use crate::backup::BackupOutcome;
use crate::commands::Out;
use crate::{Config, Result};
use std::path::{Path, PathBuf};

/// Runs one backup cycle and reports what it did.
pub async fn backup_run(mut config: Config, force: bool) -> Result<Out<BackupOutcome>> {
    let mut backup = config.backup();
    let outcome = backup.run(&mut config, force).await?;

    let message = match &outcome {
        BackupOutcome::Skipped { size } => {
            format!("Database unchanged at {size} bytes, nothing to back up")
        }
        BackupOutcome::Copied {
            succeeded, failed, ..
        } if failed.is_empty() => {
            format!("Backed up the database to {} destination(s)", succeeded.len())
        }
        BackupOutcome::Copied { succeeded, failed, .. } => format!(
            "Backed up the database to {} destination(s); {} failed: {}",
            succeeded.len(),
            failed.len(),
            failed
                .iter()
                .map(|p| format!("'{}'", p.display()))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    Ok(Out::new(message, outcome))
}

/// Validates `file` and replaces the live database with it.
pub async fn restore(config: Config, file: &Path) -> Result<Out<()>> {
    config.backup().restore(file).await?;
    Ok(format!(
        "Restored the database from '{}'. Previous data was replaced.",
        file.display()
    )
    .into())
}

/// Lists the configured backup places.
pub async fn backup_places(config: Config) -> Result<Out<Vec<PathBuf>>> {
    let places = config.backup_places().to_vec();
    let message = if places.is_empty() {
        "No backup places configured".to_string()
    } else {
        places
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(Out::new(message, places))
}

/// Adds a backup place and saves the configuration.
pub async fn place_add(mut config: Config, path: &Path) -> Result<Out<Vec<PathBuf>>> {
    config.add_backup_place(path);
    config.save().await?;
    Ok(Out::new(
        format!("Added backup place '{}'", path.display()),
        config.backup_places().to_vec(),
    ))
}

/// Removes a backup place and saves the configuration.
pub async fn place_remove(mut config: Config, path: &Path) -> Result<Out<Vec<PathBuf>>> {
    let removed = config.remove_backup_place(path);
    config.save().await?;
    let message = if removed {
        format!("Removed backup place '{}'", path.display())
    } else {
        format!("'{}' was not a configured backup place", path.display())
    };
    Ok(Out::new(message, config.backup_places().to_vec()))
}
