//! The local cache: the client's single in-memory copy of every expense it knows about.
//!
//! The cache is ordered for display, with the most recently created expense first. No two
//! entries share an id. Every operation is synchronous and does nothing but change the sequence;
//! rendering is always a separate step.

use crate::model::{Expense, ExpenseId};
use std::collections::HashSet;
use tracing::{trace, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCache {
    records: Vec<Expense>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole cache, as after a full load. If `records` repeats an id, only the
    /// first occurrence is kept.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = Expense>) {
        let mut seen = HashSet::new();
        self.records = records
            .into_iter()
            .filter(|record| {
                let first = seen.insert(record.id().clone());
                if !first {
                    warn!("Dropping duplicate expense id {} from loaded data", record.id());
                }
                first
            })
            .collect();
        trace!("Cache replaced with {} records", self.records.len());
    }

    /// Inserts a newly created record at the front. If the id is already cached, the stale entry
    /// is removed so the id appears exactly once.
    pub fn prepend(&mut self, record: Expense) {
        if self.remove_by_id(record.id()).is_some() {
            warn!("Created expense id {} was already cached, replacing it", record.id());
        }
        self.records.insert(0, record);
    }

    /// Replaces the record with `id` in place, keeping its position. Returns false, and leaves the
    /// cache untouched, when `id` is not cached.
    pub fn replace_by_id(&mut self, id: &ExpenseId, record: Expense) -> bool {
        let Some(ix) = self.position(id) else {
            warn!("Expense id {id} is not cached, the update is not applied locally");
            return false;
        };
        if record.id() != id {
            // Keep ids unique if the replacement carries an id that is cached elsewhere
            self.records
                .retain(|existing| existing.id() == id || existing.id() != record.id());
        }
        let ix = self.position(id).unwrap_or(ix);
        self.records[ix] = record;
        true
    }

    /// Removes the record with `id`, returning it if it was cached.
    pub fn remove_by_id(&mut self, id: &ExpenseId) -> Option<Expense> {
        let ix = self.position(id)?;
        Some(self.records.remove(ix))
    }

    /// Empties the cache.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &ExpenseId) -> bool {
        self.position(id).is_some()
    }

    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}
