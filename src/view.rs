//! The view synchronizer: keeps the rendered list and chart consistent with the local cache.
//!
//! Every successful trigger recomputes the view from `(cache, filter, edit form)` and renders the
//! list and then the chart from that same view. A failed remote mutation renders nothing; it
//! leaves the previous rendering on screen and emits one notice.

use crate::aggregate::{aggregate, CategoryTotals};
use crate::api::Remote;
use crate::cache::LocalCache;
use crate::error::{Failure, FailureKind, Outcome};
use crate::filter::{apply, Filter};
use crate::model::{Amount, Category, Expense, ExpenseId, ExpenseUpdates, NewExpense};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, trace};

/// The rendering surface: a list widget, a chart widget, and a place for notices.
pub trait Renderer {
    /// Draws the list from `view`. When `editing` is present, the entry with the same id is drawn
    /// as an editable form.
    fn render_list(&mut self, view: &[Expense], editing: Option<&EditForm>);

    /// Draws the pie chart. `totals` may be empty.
    fn render_chart(&mut self, totals: &CategoryTotals);

    /// Tells the user that an operation failed.
    fn notify(&mut self, failure: &Failure);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render_list(&mut self, view: &[Expense], editing: Option<&EditForm>) {
        (**self).render_list(view, editing)
    }

    fn render_chart(&mut self, totals: &CategoryTotals) {
        (**self).render_chart(totals)
    }

    fn notify(&mut self, failure: &Failure) {
        (**self).notify(failure)
    }
}

/// The edit-in-place state for one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    id: ExpenseId,
    amount: Amount,
    category: Category,
    description: String,
    date: Option<NaiveDate>,
    error: Option<String>,
}

impl EditForm {
    /// Pre-populates a form from the cached copy of `expense`.
    pub fn new(expense: &Expense) -> Self {
        Self {
            id: expense.id().clone(),
            amount: expense.amount(),
            category: expense.category().clone(),
            description: expense.description().to_string(),
            date: expense.date(),
            error: None,
        }
    }

    pub fn id(&self) -> &ExpenseId {
        &self.id
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

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// The error from the last failed save, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Overwrites the fields that are present in `changes`.
    pub fn set(&mut self, changes: &ExpenseUpdates) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(category) = &changes.category {
            self.category = category.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
    }

    /// The fields of this form that differ from `original`.
    pub fn updates(&self, original: &Expense) -> ExpenseUpdates {
        ExpenseUpdates {
            amount: (self.amount != original.amount()).then_some(self.amount),
            category: (&self.category != original.category()).then(|| self.category.clone()),
            description: (self.description != original.description())
                .then(|| self.description.clone()),
            date: (self.date != original.date()).then_some(self.date),
        }
    }
}

/// Owns the local cache and the active filter, and is the only thing that mutates them.
pub struct Tracker<R: Renderer> {
    remote: Box<dyn Remote + Send>,
    renderer: R,
    cache: LocalCache,
    filter: Filter,
    editing: Option<EditForm>,
}

impl<R: Renderer> Tracker<R> {
    pub fn new(remote: Box<dyn Remote + Send>, renderer: R) -> Self {
        Self {
            remote,
            renderer,
            cache: LocalCache::new(),
            filter: Filter::all(),
            editing: None,
        }
    }

    /// Starts with `filter` active instead of the filter that keeps everything. Nothing renders.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn editing(&self) -> Option<&EditForm> {
        self.editing.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The records that pass the active filter, in cache order.
    pub fn current_view(&self) -> Vec<Expense> {
        apply(self.cache.records(), &self.filter)
    }

    /// Replaces the cache with everything the remote service holds. On failure the cache is
    /// emptied and the empty state is rendered along with the notice.
    pub async fn load(&mut self) -> Outcome<()> {
        match self.remote.list().await {
            Ok(records) => {
                self.cache.replace_all(records);
                info!("Loaded {} expenses", self.cache.len());
                self.render();
                Ok(())
            }
            Err(failure) => {
                self.cache.clear();
                self.render();
                self.fail(failure)
            }
        }
    }

    /// Validates the fields and creates the expense. This is the add-expense form.
    pub async fn add(
        &mut self,
        amount: Amount,
        category: Category,
        description: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Outcome<Expense> {
        match NewExpense::new(amount, category, description, date) {
            Ok(expense) => self.create(&expense).await,
            Err(e) => self.fail(Failure::new(FailureKind::Validation, e)),
        }
    }

    /// Creates `expense` remotely and, only once the service has assigned its id, puts it at the
    /// front of the cache.
    pub async fn create(&mut self, expense: &NewExpense) -> Outcome<Expense> {
        match self.remote.create(expense).await {
            Ok(created) => {
                info!("Created expense {}", created.id());
                self.cache.prepend(created.clone());
                self.render();
                Ok(created)
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Sends `updates` for `id` and stores the record the service returns. On failure an open
    /// form for `id` stays open with the error attached.
    pub async fn update(&mut self, id: &ExpenseId, updates: &ExpenseUpdates) -> Outcome<Expense> {
        if let Err(e) = updates.validate() {
            return self.fail(Failure::new(FailureKind::Validation, e));
        }
        match self.remote.update(id, updates).await {
            Ok(updated) => {
                info!("Updated expense {id}");
                self.cache.replace_by_id(id, updated.clone());
                if self.editing.as_ref().is_some_and(|form| form.id() == id) {
                    self.editing = None;
                }
                self.render();
                Ok(updated)
            }
            Err(failure) => {
                if let Some(form) = self.editing.as_mut().filter(|form| form.id() == id) {
                    form.error = Some(failure.to_string());
                }
                self.fail(failure)
            }
        }
    }

    /// Deletes `id` remotely, then removes it from the cache. Nothing is removed on failure.
    pub async fn delete(&mut self, id: &ExpenseId) -> Outcome<()> {
        match self.remote.delete(id).await {
            Ok(()) => {
                info!("Deleted expense {id}");
                if self.cache.remove_by_id(id).is_none() {
                    debug!("Deleted expense {id} was not cached");
                }
                self.render();
                Ok(())
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Renders the current view again without changing anything.
    pub fn refresh(&mut self) {
        self.render();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!("Filter set to {filter}");
        self.filter = filter;
        self.render();
    }

    pub fn reset_filters(&mut self) {
        self.set_filter(Filter::all());
    }

    /// Opens an edit form for `id`, replacing any open form.
    pub fn begin_edit(&mut self, id: &ExpenseId) -> Outcome<()> {
        let Some(expense) = self.cache.get(id) else {
            return self.fail(Failure::msg(
                FailureKind::Edit,
                format!("There is no expense with id {id}"),
            ));
        };
        if let Some(open) = &self.editing {
            debug!("Discarding the open edit of {}", open.id());
        }
        self.editing = Some(EditForm::new(expense));
        self.render();
        Ok(())
    }

    /// Changes fields of the open form without sending anything.
    pub fn edit_fields(&mut self, changes: &ExpenseUpdates) -> Outcome<()> {
        if let Err(e) = changes.validate() {
            return self.fail(Failure::new(FailureKind::Validation, e));
        }
        let Some(form) = self.editing.as_mut() else {
            return self.fail(no_open_form());
        };
        form.set(changes);
        self.render();
        Ok(())
    }

    /// Submits the fields of the open form that differ from the cached copy. Returns `None` when
    /// nothing changed, in which case the form closes without a remote call.
    pub async fn save_edit(&mut self) -> Outcome<Option<Expense>> {
        let Some(form) = self.editing.as_ref() else {
            return self.fail(no_open_form());
        };
        let id = form.id().clone();
        let Some(original) = self.cache.get(&id) else {
            self.editing = None;
            return self.fail(Failure::msg(
                FailureKind::Edit,
                format!("Expense {id} is no longer available"),
            ));
        };
        let updates = form.updates(original);
        if updates.is_empty() {
            debug!("No changes to expense {id}");
            self.editing = None;
            self.render();
            return Ok(None);
        }
        self.update(&id, &updates).await.map(Some)
    }

    /// Discards the open form.
    pub fn cancel_edit(&mut self) -> Outcome<()> {
        if self.editing.take().is_none() {
            return self.fail(no_open_form());
        }
        self.render();
        Ok(())
    }

    fn render(&mut self) {
        if let Some(form) = &self.editing {
            if !self.cache.contains(form.id()) {
                debug!("Expense {} is gone, closing its edit form", form.id());
                self.editing = None;
            }
        }
        let view = self.current_view();
        let totals = aggregate(&view);
        trace!("Rendering {} of {} expenses", view.len(), self.cache.len());
        self.renderer.render_list(&view, self.editing.as_ref());
        self.renderer.render_chart(&totals);
    }

    fn fail<T>(&mut self, failure: Failure) -> Outcome<T> {
        error!("{failure}");
        self.renderer.notify(&failure);
        Err(failure)
    }
}

fn no_open_form() -> Failure {
    Failure::msg(FailureKind::Edit, "No edit is in progress")
}
