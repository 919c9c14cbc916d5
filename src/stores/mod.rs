mod auth_store;
mod budget_store;
mod errors;
mod transaction_store;

pub use auth_store::{AuthState, AuthStore, REGISTRATION_SUCCESS};
pub use budget_store::{BudgetState, BudgetStore};
pub use errors::StoreError;
pub use transaction_store::{TransactionState, TransactionStore};

/// Result of a guarded fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with `count` records from the backend.
    Loaded {
        count: usize
    },
    /// Already fetched once and no refresh was forced.
    AlreadyLoaded,
    /// Another fetch is in flight and no refresh was forced.
    InProgress,
    /// No session, nothing was requested.
    Unauthenticated
}
