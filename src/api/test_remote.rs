//! Implements the `Remote` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a running expense service.

use crate::api::Remote;
use crate::error::{Failure, FailureKind, IntoOutcome, Outcome};
use crate::model::{Amount, Category, Expense, ExpenseId, ExpenseUpdates, NewExpense};
use crate::Result;
use anyhow::{anyhow, Context};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// The data held by a `TestRemote`, and the switches that make its operations fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestRemoteState {
    /// The records, in the order the service returns them.
    pub expenses: Vec<Expense>,
    /// The id that the next created record will get.
    pub next_id: u64,
    /// Operations that currently fail.
    pub failing: BTreeSet<FailureKind>,
    /// A log of the requests received, e.g. `PATCH /expenses/1`.
    pub requests: Vec<String>,
}

impl TestRemoteState {
    /// Creates a state holding `expenses`. New ids continue after the largest numeric id.
    pub fn new(expenses: Vec<Expense>) -> Self {
        let next_id = expenses
            .iter()
            .filter_map(|e| e.id().as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            expenses,
            next_id,
            failing: BTreeSet::new(),
            requests: Vec::new(),
        }
    }
}

/// An implementation of the `Remote` trait that does not use the network. Clones share the same
/// state, so a test can keep a handle to inspect or change the service while a `Tracker` owns
/// another.
#[derive(Debug, Clone)]
pub struct TestRemote {
    state: Arc<Mutex<TestRemoteState>>,
}

impl TestRemote {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TestRemoteState::new(expenses))),
        }
    }

    /// Makes every later `kind` operation fail until `recover` is called.
    pub fn fail(&self, kind: FailureKind) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(kind);
        }
    }

    pub fn recover(&self, kind: FailureKind) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.remove(&kind);
        }
    }

    /// A snapshot of the current state.
    pub fn get_state(&self) -> TestRemoteState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    pub fn set_state(&self, new_state: TestRemoteState) {
        if let Ok(mut state) = self.state.lock() {
            *state = new_state;
        }
    }

    /// Locks the state, logs `request`, and fails if `kind` is switched to failing.
    fn begin(&self, kind: FailureKind, request: String) -> Outcome<MutexGuard<'_, TestRemoteState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Failure::msg(kind, "The test service state is poisoned"))?;
        state.requests.push(request.clone());
        if state.failing.contains(&kind) {
            return Err(Failure::msg(
                kind,
                format!("{request} failed with status 500 Internal Server Error: simulated"),
            ));
        }
        Ok(state)
    }
}

impl Default for TestRemote {
    /// Loads seed data from this module.
    fn default() -> Self {
        // The seed data is a compile-time constant that the tests below parse successfully
        Self::new(seed_expenses().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl Remote for TestRemote {
    async fn list(&mut self) -> Outcome<Vec<Expense>> {
        let state = self.begin(FailureKind::Load, "GET /expenses".to_string())?;
        Ok(state.expenses.clone())
    }

    async fn create(&mut self, expense: &NewExpense) -> Outcome<Expense> {
        let mut state = self.begin(FailureKind::Create, "POST /expenses".to_string())?;
        let id = ExpenseId::from(state.next_id);
        state.next_id += 1;
        let created = Expense::from_new(id, expense.clone());
        state.expenses.push(created.clone());
        Ok(created)
    }

    async fn update(&mut self, id: &ExpenseId, updates: &ExpenseUpdates) -> Outcome<Expense> {
        let mut state = self.begin(FailureKind::Update, format!("PATCH /expenses/{id}"))?;
        let existing = state
            .expenses
            .iter_mut()
            .find(|e| e.id() == id)
            .with_context(|| format!("PATCH /expenses/{id} failed with status 404 Not Found"))
            .or_fail(FailureKind::Update)?;
        *existing = existing.with_updates(updates);
        Ok(existing.clone())
    }

    async fn delete(&mut self, id: &ExpenseId) -> Outcome<()> {
        let mut state = self.begin(FailureKind::Delete, format!("DELETE /expenses/{id}"))?;
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id() != id);
        if state.expenses.len() == before {
            return Err(Failure::msg(
                FailureKind::Delete,
                format!("DELETE /expenses/{id} failed with status 404 Not Found"),
            ));
        }
        Ok(())
    }
}

/// Parses the seed data in this module.
fn seed_expenses() -> Result<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(EXPENSE_DATA.as_bytes()));

    let mut expenses = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Bad seed row {}", ix + 2))?;
        let field = |i: usize| record.get(i).unwrap_or_default();
        let amount = Amount::from_str(field(1)).map_err(|e| anyhow!("Bad seed amount: {e}"))?;
        let date = match field(4) {
            "" => None,
            s => Some(chrono::NaiveDate::from_str(s).context("Bad seed date")?),
        };
        let new = NewExpense::new(amount, Category::from_literal(field(2)), field(3), date)
            .map_err(|e| anyhow!("Bad seed amount: {e}"))?;
        expenses.push(Expense::from_new(ExpenseId::new(field(0)), new));
    }
    Ok(expenses)
}

/// Seed expense data.
const EXPENSE_DATA: &str = r##"id,amount,category,description,date
1,87.43,Food,Whole Foods Market,2025-10-20
2,1450.00,Housing,October rent,2025-10-01
3,52.30,Transportation,Shell gas station,2025-10-18
4,14.85,Food,Chipotle,2025-10-17
5,142.67,Utilities,PG&E electric,2025-10-16
6,32.00,Entertainment,Movie tickets,2025-10-11
7,89.99,Utilities,Comcast internet,2025-10-11
8,6.75,Food,Starbucks,
9,23.10,Pets,Dog food,2025-10-05
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_data_parses() {
        let expenses = seed_expenses().unwrap();
        assert_eq!(expenses.len(), 9);
        assert_eq!(expenses[7].date(), None);
        assert_eq!(expenses[8].category(), &Category::Other("Pets".to_string()));
        assert_eq!(TestRemote::default().get_state().next_id, 10);
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let mut remote = TestRemote::new(Vec::new());
        let new = NewExpense::new(Amount::from_str("3").unwrap(), Category::Food, "x", None).unwrap();
        let first = remote.create(&new).await.unwrap();
        let second = remote.create(&new).await.unwrap();
        assert_eq!(first.id(), &ExpenseId::from(1));
        assert_eq!(second.id(), &ExpenseId::from(2));
        assert_eq!(remote.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_switch() {
        let mut remote = TestRemote::default();
        remote.fail(FailureKind::Load);
        assert_eq!(remote.list().await.unwrap_err().kind(), FailureKind::Load);
        remote.recover(FailureKind::Load);
        assert!(remote.list().await.is_ok());
        assert_eq!(
            remote.get_state().requests,
            vec!["GET /expenses".to_string(), "GET /expenses".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let mut remote = TestRemote::default();
        let id = ExpenseId::from(404);
        let update = remote.update(&id, &ExpenseUpdates::default()).await;
        assert_eq!(update.unwrap_err().kind(), FailureKind::Update);
        let delete = remote.delete(&id).await;
        assert_eq!(delete.unwrap_err().kind(), FailureKind::Delete);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = TestRemote::default();
        let mut remote = handle.clone();
        remote.delete(&ExpenseId::from(1)).await.unwrap();
        assert_eq!(handle.get_state().expenses.len(), 8);
    }
}
