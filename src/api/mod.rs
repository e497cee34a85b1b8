//! The remote client: the seam between the local cache and the remote expense service.
//!
//! `Remote` is implemented by `HttpRemote`, which talks to the REST service, and by `TestRemote`,
//! which holds its data in memory. Every operation returns an `Outcome` whose failure is tagged
//! with the operation that failed.

mod http;
mod test_remote;

use crate::error::Outcome;
use crate::model::{Expense, ExpenseId, ExpenseUpdates, NewExpense};
use crate::{Config, Result};
use tracing::debug;

pub(crate) use http::HttpRemote;
pub use test_remote::{TestRemote, TestRemoteState};

/// The environment variable that, when set to a non-empty value, replaces the remote service with
/// an in-memory `TestRemote`.
pub const TEST_MODE_VAR: &str = "EXPENSES_IN_TEST_MODE";

/// The REST collection that holds the records.
pub(crate) const EXPENSES: &str = "expenses";

/// The operations the remote expense service offers. None of them touch the local cache or the
/// rendered view.
#[async_trait::async_trait]
pub trait Remote {
    /// Fetches every expense.
    async fn list(&mut self) -> Outcome<Vec<Expense>>;

    /// Creates `expense` and returns it with the id the service assigned.
    async fn create(&mut self, expense: &NewExpense) -> Outcome<Expense>;

    /// Applies `updates` to the expense with `id` and returns the full record after the update.
    async fn update(&mut self, id: &ExpenseId, updates: &ExpenseUpdates) -> Outcome<Expense>;

    /// Deletes the expense with `id`.
    async fn delete(&mut self, id: &ExpenseId) -> Outcome<()>;
}

/// Whether to use the real remote service or an in-memory stand-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `EXPENSES_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Remote` for `mode`.
pub fn remote(config: &Config, mode: Mode) -> Result<Box<dyn Remote + Send>> {
    match mode {
        Mode::Http => {
            debug!("Using the remote service at {}", config.base_url());
            Ok(Box::new(HttpRemote::new(config.base_url())?))
        }
        Mode::Test => {
            debug!("Using the in-memory test service");
            Ok(Box::new(TestRemote::default()))
        }
    }
}
