//! Aggregation of expenses into per-category totals for the chart.

use crate::model::{Amount, Category, Expense};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Per-category sums, in the order each category was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    totals: Vec<(Category, Amount)>,
}

impl CategoryTotals {
    pub fn get(&self, category: &Category) -> Option<Amount> {
        self.totals
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, Amount)> {
        self.totals.iter().map(|(c, amount)| (c, *amount))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The sum over all categories.
    pub fn total(&self) -> Amount {
        self.totals.iter().map(|(_, amount)| amount).sum()
    }

    fn add(&mut self, category: &Category, amount: Amount) {
        match self.totals.iter_mut().find(|(c, _)| c == category) {
            Some((_, total)) => *total = *total + amount,
            None => self.totals.push((category.clone(), amount)),
        }
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.totals.len()))?;
        for (category, amount) in &self.totals {
            map.serialize_entry(category.as_str(), amount)?;
        }
        map.end()
    }
}

/// Sums `amount` per `category`. Unknown and missing categories are summed under their literal
/// value, so no spending is dropped.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a Expense>) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for expense in records {
        totals.add(expense.category(), expense.amount());
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseId, NewExpense};
    use std::str::FromStr;

    fn expense(id: u64, amount: &str, category: Category) -> Expense {
        Expense::from_new(
            ExpenseId::from(id),
            NewExpense::new(Amount::from_str(amount).unwrap(), category, "", None).unwrap(),
        )
    }

    #[test]
    fn test_empty_input_is_empty() {
        let totals = aggregate(&Vec::<Expense>::new());
        assert!(totals.is_empty());
        assert_eq!(totals.total(), Amount::ZERO);
        assert_eq!(serde_json::to_string(&totals).unwrap(), "{}");
    }

    #[test]
    fn test_sums_per_category_in_first_seen_order() {
        let records = vec![
            expense(1, "10.10", Category::Housing),
            expense(2, "5", Category::Food),
            expense(3, "0.90", Category::Housing),
            expense(4, "3", Category::Utilities),
        ];
        let totals = aggregate(&records);
        let order: Vec<&Category> = totals.iter().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![&Category::Housing, &Category::Food, &Category::Utilities]
        );
        assert_eq!(totals.get(&Category::Housing), Some(Amount::from_str("11").unwrap()));
        assert_eq!(totals.get(&Category::Entertainment), None);
    }

    #[test]
    fn test_total_equals_sum_of_inputs() {
        let records = vec![
            expense(1, "0.1", Category::Food),
            expense(2, "0.2", Category::Housing),
            expense(3, "19.99", Category::Other("Pets".to_string())),
            expense(4, "1234.56", Category::default()),
        ];
        let expected: Amount = records.iter().map(|r| r.amount()).collect::<Vec<_>>().iter().sum();
        assert_eq!(aggregate(&records).total(), expected);
        assert_eq!(expected, Amount::from_str("1254.85").unwrap());
    }

    #[test]
    fn test_unknown_and_missing_categories_are_kept() {
        let records = vec![
            expense(1, "4", Category::Other("Pets".to_string())),
            expense(2, "6", Category::default()),
            expense(3, "1", Category::Other("Pets".to_string())),
        ];
        let totals = aggregate(&records);
        assert_eq!(
            totals.get(&Category::Other("Pets".to_string())),
            Some(Amount::from_str("5").unwrap())
        );
        assert_eq!(totals.get(&Category::default()), Some(Amount::from_str("6").unwrap()));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let records = vec![
            expense(1, "20", Category::Food),
            expense(2, "7.5", Category::Housing),
        ];
        let json = serde_json::to_string(&aggregate(&records)).unwrap();
        assert_eq!(json, r#"{"Food":20,"Housing":7.5}"#);
    }
}
