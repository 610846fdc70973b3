use cashd::args::{
    Args, BackupSubcommand, Command, CustomerSubcommand, PlacesSubcommand, PrefsSubcommand,
    StatsSubcommand, TxSubcommand,
};
use cashd::{commands, Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashd_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Customer(customer_args) => {
            let config = Config::load(home).await?;
            match customer_args.entity() {
                CustomerSubcommand::Add(fields) => {
                    commands::customer_add(config, fields).await?.print()
                }
                CustomerSubcommand::Edit(edit) => {
                    commands::customer_edit(config, edit.id(), edit.fields())
                        .await?
                        .print()
                }
                CustomerSubcommand::List(list) => {
                    commands::customer_list(config, list).await?.print()
                }
                CustomerSubcommand::Show(show) => {
                    commands::customer_show(config, show.id()).await?.print()
                }
            }
        }

        Command::Tx(tx_args) => {
            let config = Config::load(home).await?;
            match tx_args.entity() {
                TxSubcommand::Insert(insert) => commands::tx_insert(config, insert).await?.print(),
                TxSubcommand::Delete(delete) => {
                    commands::tx_delete(config, delete.id()).await?.print()
                }
                TxSubcommand::List(list) => {
                    commands::tx_list(config, list.customer_id(), list.list())
                        .await?
                        .print()
                }
            }
        }

        Command::Stats(stats_args) => {
            let config = Config::load(home).await?;
            match stats_args.table() {
                StatsSubcommand::Balance(balance) => {
                    commands::stats_balance(config, balance.group_by(), balance.list())
                        .await?
                        .print()
                }
                StatsSubcommand::Highest(list) => {
                    commands::stats_highest(config, list).await?.print()
                }
                StatsSubcommand::Inactive(list) => {
                    commands::stats_inactive(config, list).await?.print()
                }
                StatsSubcommand::Recent(list) => {
                    commands::stats_recent(config, list).await?.print()
                }
            }
        }

        Command::Backup(backup_args) => {
            let config = Config::load(home).await?;
            match backup_args.action() {
                BackupSubcommand::Run(run) => {
                    commands::backup_run(config, run.force()).await?.print()
                }
                BackupSubcommand::Restore(restore) => {
                    commands::restore(config, restore.file()).await?.print()
                }
                BackupSubcommand::Places(places) => match places.action() {
                    None => commands::backup_places(config).await?.print(),
                    Some(PlacesSubcommand::Add(place)) => {
                        commands::place_add(config, place.path()).await?.print()
                    }
                    Some(PlacesSubcommand::Remove(place)) => {
                        commands::place_remove(config, place.path()).await?.print()
                    }
                },
            }
        }

        Command::Prefs(prefs_args) => {
            let config = Config::load(home).await?;
            match prefs_args.action() {
                PrefsSubcommand::Show => commands::prefs_show(config).await?.print(),
                PrefsSubcommand::Set(set) => commands::prefs_set(config, set).await?.print(),
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
