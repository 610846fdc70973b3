//! Backup management for the database file.
//!
//! A backup run is a small state machine: check whether the file size changed
//! since the last recorded run, decide whether to copy, fan the copy out to
//! every configured destination, then record the new size. The fan-out is
//! best-effort; one unwritable destination never blocks the others.

use crate::db::Db;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix for database backup files in the local backups directory.
pub const SQLITE: &str = "cashd.sqlite";

/// Number of dated copies kept in the local backups directory.
const LOCAL_COPIES: usize = 5;

/// Where a backup run currently stands. Every run starts and ends at `Idle`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    #[default]
    Idle,
    SizeCheckPending,
    Copying,
}

/// What a backup run did.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOutcome {
    /// The file size matched the recorded size; no I/O was performed.
    Skipped { size: u64 },
    /// The file was copied to each destination, best-effort.
    Copied {
        succeeded: Vec<PathBuf>,
        failed: Vec<PathBuf>,
        size: u64,
    },
}

/// Runs backups of the database file and restores from backup copies.
///
/// Owns copies of the paths and settings it needs. Create a new instance via
/// `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    db_path: PathBuf,
    places: Vec<PathBuf>,
    state: BackupState,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            db_path: config.db_path().to_path_buf(),
            places: config.backup_places().to_vec(),
            state: BackupState::Idle,
        }
    }

    pub fn state(&self) -> BackupState {
        self.state
    }

    /// Runs one backup cycle.
    ///
    /// Compares the database file size against the size recorded on `config`.
    /// When they match (and `force` is false and size checking is enabled)
    /// nothing is copied. Otherwise the file is copied to the local backups
    /// directory and to every configured backup place, one at a time; per-
    /// destination failures are logged and collected, never propagated. The
    /// new size is recorded and saved on `config` whenever copies were
    /// attempted, even if some destination failed.
    pub async fn run(&mut self, config: &mut Config, force: bool) -> Result<BackupOutcome> {
        self.state = BackupState::SizeCheckPending;
        let size = utils::file_size(&self.db_path).await?;

        if !force && config.check_file_size() && size == config.last_db_size() {
            info!("database size unchanged at {size} bytes, skipping backup");
            self.state = BackupState::Idle;
            return Ok(BackupOutcome::Skipped { size });
        }

        self.state = BackupState::Copying;
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        match self.copy_local().await {
            Ok(path) => succeeded.push(path),
            Err(e) => {
                warn!("local backup copy failed: {e:#}");
                failed.push(self.backups_dir.clone());
            }
        }

        for place in &self.places {
            let destination = place.join(SQLITE);
            match utils::copy(&self.db_path, &destination).await {
                Ok(_) => {
                    info!("copied database to '{}'", destination.display());
                    succeeded.push(destination);
                }
                Err(e) => {
                    warn!("backup to '{}' failed: {e:#}", place.display());
                    failed.push(place.clone());
                }
            }
        }

        config.set_last_db_size(size);
        config.save().await?;

        self.state = BackupState::Idle;
        Ok(BackupOutcome::Copied {
            succeeded,
            failed,
            size,
        })
    }

    /// Replaces the live database file with `candidate`.
    ///
    /// The candidate is structurally validated first; a file that cannot be
    /// opened and queried as a ledger database is rejected with
    /// `InvalidFormat` and the live file is left untouched.
    pub async fn restore(&self, candidate: impl AsRef<Path>) -> Result<()> {
        let candidate = candidate.as_ref();
        Db::validate(candidate).await?;
        utils::copy(candidate, &self.db_path).await?;
        info!("restored database from '{}'", candidate.display());
        Ok(())
    }

    /// Copies the database into the local backups directory as
    /// `cashd.sqlite.YYYY-MM-DD-NNN`, rotating old copies.
    async fn copy_local(&self) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(&date).await?;
        let path = self.backups_dir.join(format!("{SQLITE}.{date}-{seq:03}"));

        utils::copy(&self.db_path, &path).await?;
        self.rotate().await?;
        Ok(path)
    }

    /// Scans the backups directory for copies made today and returns the next
    /// sequence number.
    async fn next_sequence_number(&self, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            if let Some(seq) = parse_sequence_number(&file_name.to_string_lossy(), date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Deletes the oldest local copies beyond `LOCAL_COPIES`.
    async fn rotate(&self) -> Result<()> {
        let mut names: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&format!("{SQLITE}.")) {
                names.push((entry.path(), name));
            }
        }

        // The filename format sorts by date then sequence number.
        names.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = names.len().saturating_sub(LOCAL_COPIES);
        for (path, _) in names.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a local backup filename made on `date`.
/// Returns None if the filename doesn't match `cashd.sqlite.{date}-{NNN}`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{SQLITE}.{date}-");
    filename.strip_prefix(&expected_start)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use tempfile::TempDir;

    async fn test_home() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path().join("cashd_home")).await.unwrap();
        (dir, config)
    }

    async fn grow_db_file(config: &Config) {
        let mut bytes = tokio::fs::read(config.db_path()).await.unwrap();
        bytes.extend_from_slice(&[0u8; 64]);
        tokio::fs::write(config.db_path(), bytes).await.unwrap();
    }

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("cashd.sqlite.2026-08-27-001", "2026-08-27"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("cashd.sqlite.2026-08-27-042", "2026-08-27"),
            Some(42)
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("cashd.sqlite.2026-08-26-001", "2026-08-27"),
            None
        );
        // Not a backup file
        assert_eq!(parse_sequence_number("config.json", "2026-08-27"), None);
    }

    #[tokio::test]
    async fn test_unchanged_size_skips() {
        let (_dir, mut config) = test_home().await;
        let size = utils::file_size(config.db_path()).await.unwrap();
        config.set_last_db_size(size);

        let mut backup = config.backup();
        let outcome = backup.run(&mut config, false).await.unwrap();

        assert_eq!(outcome, BackupOutcome::Skipped { size });
        assert_eq!(backup.state(), BackupState::Idle);
    }

    #[tokio::test]
    async fn test_changed_size_copies_and_records() {
        let (_dir, mut config) = test_home().await;
        let stale = utils::file_size(config.db_path()).await.unwrap();
        config.set_last_db_size(stale);
        grow_db_file(&config).await;
        let current = utils::file_size(config.db_path()).await.unwrap();

        let mut backup = config.backup();
        let outcome = backup.run(&mut config, false).await.unwrap();

        match outcome {
            BackupOutcome::Copied {
                succeeded,
                failed,
                size,
            } => {
                assert_eq!(size, current);
                assert_eq!(succeeded.len(), 1);
                assert!(succeeded[0].starts_with(config.backups()));
                assert!(succeeded[0].is_file());
                assert!(failed.is_empty());
            }
            other => panic!("expected a copy, got {other:?}"),
        }
        assert_eq!(config.last_db_size(), current);

        // The recorded size was saved, so a reloaded config skips.
        let mut reloaded = Config::load(config.root()).await.unwrap();
        let outcome = reloaded.backup().run(&mut reloaded, false).await.unwrap();
        assert!(matches!(outcome, BackupOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_force_ignores_size_check() {
        let (_dir, mut config) = test_home().await;
        let size = utils::file_size(config.db_path()).await.unwrap();
        config.set_last_db_size(size);

        let outcome = config.backup().run(&mut config, true).await.unwrap();
        assert!(matches!(outcome, BackupOutcome::Copied { .. }));
    }

    #[tokio::test]
    async fn test_fan_out_to_places() {
        let (dir, mut config) = test_home().await;
        let place = dir.path().join("usb");
        tokio::fs::create_dir(&place).await.unwrap();
        config.add_backup_place(&place);

        let outcome = config.backup().run(&mut config, true).await.unwrap();
        match outcome {
            BackupOutcome::Copied { succeeded, .. } => {
                assert!(succeeded.contains(&place.join(SQLITE)));
            }
            other => panic!("expected a copy, got {other:?}"),
        }
        assert!(place.join(SQLITE).is_file());
    }

    #[tokio::test]
    async fn test_failed_place_does_not_block_others() {
        let (dir, mut config) = test_home().await;
        let missing = dir.path().join("does-not-exist").join("nested");
        let place = dir.path().join("usb");
        tokio::fs::create_dir(&place).await.unwrap();
        config.add_backup_place(&missing);
        config.add_backup_place(&place);

        let current = utils::file_size(config.db_path()).await.unwrap();
        let outcome = config.backup().run(&mut config, true).await.unwrap();

        match outcome {
            BackupOutcome::Copied {
                succeeded,
                failed,
                size,
            } => {
                assert_eq!(failed, vec![missing]);
                assert!(succeeded.contains(&place.join(SQLITE)));
                assert_eq!(size, current);
            }
            other => panic!("expected a copy, got {other:?}"),
        }
        // The size is recorded even after a partial failure.
        assert_eq!(config.last_db_size(), current);
    }

    #[tokio::test]
    async fn test_restore_rejects_garbage() {
        let (dir, config) = test_home().await;
        let candidate = dir.path().join("garbage.sqlite");
        tokio::fs::write(&candidate, b"not a database").await.unwrap();
        let live_before = tokio::fs::read(config.db_path()).await.unwrap();

        let err = config.backup().restore(&candidate).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InvalidFormat(_))
        ));

        // The live file was never touched.
        let live_after = tokio::fs::read(config.db_path()).await.unwrap();
        assert_eq!(live_before, live_after);
    }

    #[tokio::test]
    async fn test_restore_replaces_live_database() {
        let (dir, config) = test_home().await;
        // A second, separately-initialized database acts as the candidate.
        let other_home = Config::create(dir.path().join("other_home")).await.unwrap();

        config.backup().restore(other_home.db_path()).await.unwrap();

        let live = tokio::fs::read(config.db_path()).await.unwrap();
        let candidate = tokio::fs::read(other_home.db_path()).await.unwrap();
        assert_eq!(live, candidate);
    }
}
