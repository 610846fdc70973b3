//! Command handlers for the cashd CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod backup;
mod customer;
mod init;
mod prefs;
mod stats;
mod transaction;

use crate::args::ListArgs;
use crate::source::{PageSource, SearchableRow};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use backup::{backup_places, backup_run, place_add, place_remove, restore};
pub use customer::{customer_add, customer_edit, customer_list, customer_show, CustomerView};
pub use init::init;
pub use prefs::{prefs_set, prefs_show, Prefs};
pub use stats::{stats_balance, stats_highest, stats_inactive, stats_recent};
pub use transaction::{tx_delete, tx_insert, tx_list};

/// The output type for a command. This allows the command to return a
/// consistent message and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the
    /// command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as
    /// JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Applies the search filter and page selection to `source`, renders each row
/// of the resulting page with `line`, and returns the page rows along with a
/// printable listing ending in the "showing X-Y of Z" label.
fn render_page<R, F>(mut source: PageSource<R>, list: &ListArgs, line: F) -> Out<Vec<R>>
where
    R: SearchableRow + Serialize + Clone + Debug,
    F: Fn(&R) -> String,
{
    source.set_search_text(list.search());
    for _ in 0..list.page() {
        source.next_page();
    }

    let rows: Vec<R> = source.current_page().into_iter().cloned().collect();
    let mut message = String::new();
    for row in &rows {
        message.push_str(&line(row));
        message.push('\n');
    }
    message.push_str(&source.page_label());
    Out::new(message, rows)
}
