//! Configuration file handling.
//!
//! The configuration file is stored at `$CASHD_HOME/config.json` and contains
//! the user's preferences (default state and city, page size) along with the
//! backup settings and the recorded size of the database file.

use crate::backup::Backup;
use crate::db::Db;
use crate::model::StateCode;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cashd";
const CONFIG_VERSION: u8 = 1;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const CASHD_SQLITE: &str = "cashd.sqlite";
const DEFAULT_PAGE_SIZE: usize = 20;

/// The `Config` object represents the data directory of the app. You
/// instantiate it by providing the path to `$CASHD_HOME` and from there it
/// loads `$CASHD_HOME/config.json` and opens the database. Preference
/// mutations only touch memory; nothing reaches disk until `save`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    db_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
}

impl Config {
    /// Creates the data directory and its contents:
    /// - `config.json` with default settings
    /// - an empty SQLite database
    /// - the `.backups` subdirectory
    ///
    /// # Errors
    /// Returns an error if the directory holds a database already or if any
    /// file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashd home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let db_path = root.join(CASHD_SQLITE);
        let db = Db::init(&db_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            db_path,
            config_file,
            db,
        })
    }

    /// This will
    /// - validate that `cashd_home`, the config file and the backups
    ///   directory exist
    /// - load the config file
    /// - open the database, migrating it if out-of-date
    pub async fn load(cashd_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = cashd_home.into();
        let root = utils::canonicalize(&maybe_relative).await?;

        let _ = utils::read_dir(&root)
            .await
            .context("Cashd Home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let db_path = root.join(CASHD_SQLITE);
        let db = Db::load(&db_path)
            .await
            .context("Unable to load SQLite DB")?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            db_path,
            config_file,
            db,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    /// Writes the current in-memory settings to `config.json`.
    pub async fn save(&self) -> Result<()> {
        self.config_file.save(&self.config_path).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    pub fn default_state(&self) -> StateCode {
        self.config_file.default_state.unwrap_or_default()
    }

    pub fn set_default_state(&mut self, state: StateCode) {
        self.config_file.default_state = Some(state);
    }

    pub fn default_city(&self) -> &str {
        self.config_file.default_city.as_deref().unwrap_or("")
    }

    pub fn set_default_city(&mut self, city: impl Into<String>) {
        self.config_file.default_city = Some(city.into());
    }

    /// Rows per page for all list surfaces. Never zero.
    pub fn page_size(&self) -> usize {
        self.config_file.page_size.max(1)
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.config_file.page_size = page_size.max(1);
    }

    pub fn check_file_size(&self) -> bool {
        self.config_file.check_file_size
    }

    pub fn set_check_file_size(&mut self, check: bool) {
        self.config_file.check_file_size = check;
    }

    pub fn backup_places(&self) -> &[PathBuf] {
        &self.config_file.backup_places
    }

    /// Registers an extra directory that receives backup copies. Duplicates
    /// are ignored.
    pub fn add_backup_place(&mut self, place: impl Into<PathBuf>) {
        let place = place.into();
        if !self.config_file.backup_places.contains(&place) {
            self.config_file.backup_places.push(place);
        }
    }

    /// Removes a registered backup directory. Returns whether it was present.
    pub fn remove_backup_place(&mut self, place: &Path) -> bool {
        let before = self.config_file.backup_places.len();
        self.config_file.backup_places.retain(|p| p != place);
        self.config_file.backup_places.len() != before
    }

    /// The database file size recorded by the last completed backup.
    pub fn last_db_size(&self) -> u64 {
        self.config_file.last_db_size
    }

    pub fn set_last_db_size(&mut self, size: u64) {
        self.config_file.last_db_size = size;
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashd",
///   "config_version": 1,
///   "default_state": "PE",
///   "default_city": "Palmares",
///   "page_size": 20,
///   "check_file_size": true,
///   "backup_places": ["/mnt/usb/cashd"],
///   "last_db_size": 16384
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashd"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// State pre-filled in the new-customer form
    #[serde(skip_serializing_if = "Option::is_none")]
    default_state: Option<StateCode>,

    /// City pre-filled in the new-customer form
    #[serde(skip_serializing_if = "Option::is_none")]
    default_city: Option<String>,

    /// Rows per page for list surfaces
    #[serde(default = "default_page_size")]
    page_size: usize,

    /// When true, a backup run is skipped if the database file size has not
    /// changed since the last recorded backup
    #[serde(default = "default_check_file_size")]
    check_file_size: bool,

    /// Extra directories that receive a copy of the database on backup
    #[serde(default)]
    backup_places: Vec<PathBuf>,

    /// Database file size recorded by the last completed backup, in bytes
    #[serde(default)]
    last_db_size: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_check_file_size() -> bool {
    true
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            default_state: None,
            default_city: None,
            page_size: DEFAULT_PAGE_SIZE,
            check_file_size: true,
            backup_places: Vec::new(),
            last_db_size: 0,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("cashd_home");

        let config = Config::create(&home_dir).await.unwrap();

        assert!(config.backups().is_dir());
        assert!(config.config_path().is_file());
        assert!(config.db_path().is_file());
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert!(config.check_file_size());
        assert!(config.backup_places().is_empty());
    }

    #[tokio::test]
    async fn test_config_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("cashd_home");
        let mut config = Config::create(&home_dir).await.unwrap();

        config.set_default_state(StateCode::SP);
        config.set_default_city("Palmares");
        config.set_page_size(15);
        config.add_backup_place("/mnt/usb/cashd");
        config.set_last_db_size(4096);
        config.save().await.unwrap();

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.default_state(), StateCode::SP);
        assert_eq!(loaded.default_city(), "Palmares");
        assert_eq!(loaded.page_size(), 15);
        assert_eq!(loaded.backup_places(), [PathBuf::from("/mnt/usb/cashd")]);
        assert_eq!(loaded.last_db_size(), 4096);
    }

    #[tokio::test]
    async fn test_mutations_stay_in_memory_until_save() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("cashd_home");
        let mut config = Config::create(&home_dir).await.unwrap();

        config.set_page_size(7);
        // Not saved, so a fresh load sees the default.
        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.page_size(), DEFAULT_PAGE_SIZE);

        config.save().await.unwrap();
        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.page_size(), 7);
    }

    #[tokio::test]
    async fn test_config_load_requires_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_backup_places_dedupe_and_remove() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path().join("cashd_home")).await.unwrap();

        config.add_backup_place("/a");
        config.add_backup_place("/b");
        config.add_backup_place("/a");
        assert_eq!(config.backup_places().len(), 2);

        assert!(config.remove_backup_place(Path::new("/a")));
        assert!(!config.remove_backup_place(Path::new("/a")));
        assert_eq!(config.backup_places(), [PathBuf::from("/b")]);
    }

    #[tokio::test]
    async fn test_page_size_never_zero() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path().join("cashd_home")).await.unwrap();
        config.set_page_size(0);
        assert_eq!(config.page_size(), 1);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1
        }"#;

        let mut file = tokio::fs::File::create(&config_path).await.unwrap();
        file.write_all(json.as_bytes()).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "cashd",
            "config_version": 1
        }"#;

        let mut file = tokio::fs::File::create(&config_path).await.unwrap();
        file.write_all(json.as_bytes()).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.check_file_size);
        assert!(config.backup_places.is_empty());
        assert_eq!(config.last_db_size, 0);
    }

    #[test]
    fn test_config_file_serialization_omits_unset_defaults() {
        let config = ConfigFile::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("default_state"));
        assert!(!json.contains("default_city"));
    }
}
