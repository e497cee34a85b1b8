//! These structs provide the CLI interface for the expenses CLI.

use crate::filter::{CategoryFilter, Filter};
use crate::model::{Amount, Category, ExpenseId, ExpenseUpdates};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses.
///
/// The expenses are kept by a remote REST service. This program loads them, shows them as a
/// table and as a pie chart of spending per category, and adds, updates and deletes them. Use
/// the shell subcommand for an interactive session that keeps the list and chart in sync with
/// every change.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Pass the address of the expense service as
    /// --base-url; the expenses are expected at $BASE_URL/expenses.
    Init(InitArgs),
    /// Show the expenses as a table followed by a chart.
    List(FilterArgs),
    /// Show only the chart of spending per category.
    Chart(FilterArgs),
    /// Add an expense.
    Add(AddArgs),
    /// Change fields of an expense. Only the fields you pass are sent.
    Update(UpdateArgs),
    /// Delete an expense.
    Delete(DeleteArgs),
    /// Start an interactive session. Type `help` once it starts.
    Shell,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,

    /// Do not color the chart.
    #[arg(long)]
    no_color: bool,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }

    pub fn color(&self) -> bool {
        !self.no_color
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the expense service, e.g. http://localhost:3000
    #[arg(long)]
    base_url: String,
}

impl InitArgs {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// The filter controls: a category selector and an inclusive date range.
#[derive(Debug, ClapArgs, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Show only this category, or `all`.
    #[arg(long, default_value_t = CategoryFilter::All)]
    category: CategoryFilter,

    /// Show only expenses on or after this date (YYYY-MM-DD). Undated expenses are hidden.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Show only expenses on or before this date (YYYY-MM-DD). Undated expenses are hidden.
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn new(category: CategoryFilter, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            category,
            start,
            end,
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::new(self.category.clone(), self.start, self.end)
    }
}

/// The add-expense form. Every field is required.
#[derive(Debug, ClapArgs, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// The amount, zero or more.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// One of Food, Housing, Entertainment, Transportation, Utilities.
    #[arg(long)]
    category: Category,

    #[arg(long)]
    description: String,

    /// The date of the expense (YYYY-MM-DD).
    #[arg(long)]
    date: NaiveDate,
}

impl AddArgs {
    pub fn new(
        amount: Amount,
        category: Category,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            category,
            description: description.into(),
            date,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Fields to change. Fields that are not passed are left alone.
#[derive(Debug, ClapArgs, Clone, Default, PartialEq, Eq)]
pub struct UpdateFieldArgs {
    /// The new amount, zero or more.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<Amount>,

    /// The new category.
    #[arg(long)]
    category: Option<Category>,

    /// The new description. Pass an empty string to clear it.
    #[arg(long)]
    description: Option<String>,

    /// The new date (YYYY-MM-DD).
    #[arg(long, conflicts_with = "clear_date")]
    date: Option<NaiveDate>,

    /// Remove the date.
    #[arg(long)]
    clear_date: bool,
}

impl UpdateFieldArgs {
    pub fn updates(&self) -> ExpenseUpdates {
        let date = match (self.date, self.clear_date) {
            (_, true) => Some(None),
            (Some(date), false) => Some(Some(date)),
            (None, false) => None,
        };
        ExpenseUpdates {
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date,
        }
    }
}

/// Args for the `expenses update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the expense to change.
    id: ExpenseId,

    #[command(flatten)]
    fields: UpdateFieldArgs,
}

impl UpdateArgs {
    pub fn new(id: ExpenseId, fields: UpdateFieldArgs) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn updates(&self) -> ExpenseUpdates {
        self.fields.updates()
    }
}

/// Args for the `expenses delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the expense to delete.
    id: ExpenseId,
}

impl DeleteArgs {
    pub fn new(id: ExpenseId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
