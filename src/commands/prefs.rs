//! Preference commands.

use crate::args::PrefsSetArgs;
use crate::commands::Out;
use crate::error::LedgerError;
use crate::model::StateCode;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// The preferences as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct Prefs {
    pub default_state: StateCode,
    pub default_city: String,
    pub page_size: usize,
    pub check_file_size: bool,
    pub backup_places: Vec<PathBuf>,
    pub last_db_size: u64,
}

impl Prefs {
    fn from_config(config: &Config) -> Self {
        Self {
            default_state: config.default_state(),
            default_city: config.default_city().to_string(),
            page_size: config.page_size(),
            check_file_size: config.check_file_size(),
            backup_places: config.backup_places().to_vec(),
            last_db_size: config.last_db_size(),
        }
    }
}

/// Prints the current preferences.
pub async fn prefs_show(config: Config) -> Result<Out<Prefs>> {
    let prefs = Prefs::from_config(&config);
    let message = format!(
        "default state:   {}\n\
         default city:    {}\n\
         page size:       {}\n\
         check file size: {}\n\
         backup places:   {}",
        prefs.default_state,
        if prefs.default_city.is_empty() {
            "(unset)"
        } else {
            &prefs.default_city
        },
        prefs.page_size,
        prefs.check_file_size,
        prefs.backup_places.len()
    );
    Ok(Out::new(message, prefs))
}

/// Applies the given preference changes and saves the configuration.
pub async fn prefs_set(mut config: Config, args: &PrefsSetArgs) -> Result<Out<Prefs>> {
    if let Some(state) = args.state() {
        let code = StateCode::from_str(&state.trim().to_uppercase()).map_err(|_| {
            LedgerError::Validation(format!("'{state}' is not a valid state code"))
        })?;
        config.set_default_state(code);
    }
    if let Some(city) = args.city() {
        config.set_default_city(city);
    }
    if let Some(page_size) = args.page_size() {
        config.set_page_size(page_size);
    }
    if let Some(check) = args.check_file_size() {
        config.set_check_file_size(check);
    }
    config.save().await?;

    Ok(Out::new(
        "Preferences saved",
        Prefs::from_config(&config),
    ))
}
