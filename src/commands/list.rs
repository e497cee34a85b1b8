use crate::aggregate::{aggregate, CategoryTotals};
use crate::api::{self, Mode};
use crate::args::FilterArgs;
use crate::commands::Out;
use crate::filter::Filter;
use crate::model::Expense;
use crate::view::{Renderer, Tracker};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;

/// What `list` showed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub filter: Filter,
    pub expenses: Vec<Expense>,
    pub totals: CategoryTotals,
}

/// Loads every expense and renders the filtered list and chart once.
///
/// # Errors
/// - Returns an error if the expenses cannot be loaded. The empty state and a notice are rendered
///   first.
pub async fn list<R: Renderer>(
    config: &Config,
    mode: Mode,
    args: &FilterArgs,
    renderer: R,
) -> Result<Out<Listing>> {
    let mut tracker = Tracker::new(api::remote(config, mode)?, renderer).with_filter(args.filter());
    tracker
        .load()
        .await
        .context("Unable to list the expenses")?;
    let expenses = tracker.current_view();
    let totals = aggregate(&expenses);
    let message = format!(
        "Showing {} of {} expenses ({})",
        expenses.len(),
        tracker.cache().len(),
        tracker.filter()
    );
    Ok(Out::new(
        message,
        Listing {
            filter: tracker.filter().clone(),
            expenses,
            totals,
        },
    ))
}

/// Like `list`, for a renderer that only draws the chart. The output is the per-category totals.
pub async fn chart<R: Renderer>(
    config: &Config,
    mode: Mode,
    args: &FilterArgs,
    renderer: R,
) -> Result<Out<CategoryTotals>> {
    let out = list(config, mode, args, renderer).await?;
    let totals = out
        .structure()
        .map(|listing| listing.totals.clone())
        .unwrap_or_default();
    let message = format!(
        "Total spending {} across {} categories",
        totals.total(),
        totals.len()
    );
    Ok(Out::new(message, totals))
}
