mod budget;
mod errors;
mod filter;
mod stats;
#[cfg(test)]
mod tests;
mod transaction;
mod user;

pub use budget::{calculate_spending, AlertStatus, Budget, BudgetOverview, BudgetStatus, NewBudget};
pub use errors::ValidationError;
pub use filter::{FilterUpdate, TransactionFilter};
pub use stats::TransactionStats;
pub use transaction::{NewTransaction, Transaction, MAX_DESCRIPTION_LENGTH};
pub use user::{validate_password, AuthToken, Credentials, ForgotPassword, MessageResponse, PasswordReset, Registration, User};
