//! Types that represent the core data model, such as `Expense` and `Category`.
mod amount;
mod category;
mod expense;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use expense::{Expense, ExpenseId, ExpenseUpdates, NewExpense, DATE_FORMAT};
