mod category;
mod errors;
mod monetary;
#[cfg(test)]
mod tests;
mod transaction_type;

pub use category::{display_name, lookup, Category, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use errors::ParseError;
pub use monetary::{format_currency, format_percentage, percentage_of, total};
pub use transaction_type::TransactionType;

pub type TransactionId = String;
pub type BudgetId = String;
pub type UserId = String;
