//! The filter engine: derives the subset of the cache that is currently shown.

use crate::model::{Category, Expense};
use chrono::NaiveDate;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ALL_STR: &str = "all";

/// The category selector: either every category or exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.pad(ALL_STR),
            CategoryFilter::Only(category) => f.pad(category.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_STR) {
            return Ok(CategoryFilter::All);
        }
        Ok(CategoryFilter::Only(Category::from_str(trimmed)?))
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// The active filter: a category selection and optional inclusive date bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    category: CategoryFilter,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl Filter {
    pub fn new(
        category: CategoryFilter,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            category,
            start_date,
            end_date,
        }
    }

    /// The filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// True when either date bound is set.
    pub fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Whether `expense` belongs in the view. An expense without a date is excluded by any date
    /// bound and included when there is none.
    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.category.matches(expense.category()) {
            return false;
        }
        if !self.has_date_bounds() {
            return true;
        }
        let Some(date) = expense.date() else {
            return false;
        };
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "category={}", self.category)?;
        if let Some(start) = self.start_date {
            write!(f, " start={start}")?;
        }
        if let Some(end) = self.end_date {
            write!(f, " end={end}")?;
        }
        Ok(())
    }
}

/// Returns the records that pass `filter`, in their original order. `records` is not modified.
pub fn apply(records: &[Expense], filter: &Filter) -> Vec<Expense> {
    records
        .iter()
        .filter(|expense| filter.matches(expense))
        .cloned()
        .collect()
}
