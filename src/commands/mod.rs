//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod delete;
mod init;
mod list;
mod shell;
mod update;

use crate::aggregate::CategoryTotals;
use crate::api::{self, Mode};
use crate::error::Failure;
use crate::model::Expense;
use crate::view::{EditForm, Renderer, Tracker};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use delete::delete;
pub use init::init;
pub use list::{chart, list, Listing};
pub use shell::shell;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
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

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Holds back list and chart renders until it is opened. Notices always pass through.
struct Gated<R> {
    inner: R,
    open: bool,
}

impl<R: Renderer> Renderer for Gated<R> {
    fn render_list(&mut self, view: &[Expense], editing: Option<&EditForm>) {
        if self.open {
            self.inner.render_list(view, editing);
        }
    }

    fn render_chart(&mut self, totals: &CategoryTotals) {
        if self.open {
            self.inner.render_chart(totals);
        }
    }

    fn notify(&mut self, failure: &Failure) {
        self.inner.notify(failure);
    }
}

/// Loads the cache without drawing it, so that a one-shot mutation draws the view only once,
/// after the mutation.
async fn loaded_quietly<R: Renderer>(
    config: &Config,
    mode: Mode,
    renderer: R,
) -> Result<Tracker<Gated<R>>> {
    let gated = Gated {
        inner: renderer,
        open: false,
    };
    let mut tracker = Tracker::new(api::remote(config, mode)?, gated);
    tracker
        .load()
        .await
        .context("Unable to load the expenses")?;
    tracker.renderer_mut().open = true;
    Ok(tracker)
}
