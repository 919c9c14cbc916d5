use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::FinanceApi;
use crate::models::{FilterUpdate, NewTransaction, Transaction, TransactionFilter, TransactionStats};
use crate::stores::{AuthState, FetchOutcome, StoreError};

const ADD_FAILED: &str = "Failed to add transaction";
const UPDATE_FAILED: &str = "Failed to update transaction";
const DELETE_FAILED: &str = "Failed to delete transaction";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionState {
    /// Every transaction known locally, in backend order.
    pub all: Vec<Transaction>,
    pub filter: TransactionFilter,
    pub loading: bool,
    pub has_fetched: bool,
    pub error: Option<String>
}

impl TransactionState {
    pub fn filtered(&self) -> Vec<Transaction> {
        self.filter.apply(&self.all)
    }

    /// Aggregates over the filtered set.
    pub fn stats(&self) -> TransactionStats {
        TransactionStats::from_transactions(self.all.iter().filter(|transaction| self.filter.matches(transaction)))
    }
}

/// Caches the user's transactions and derives the filtered list and statistics from them.
///
/// The list is replaced wholesale on fetch and patched locally after each successful mutation,
/// so a created transaction is listed without a re-fetch. Subscribers are notified of every change.
pub struct TransactionStore<A: FinanceApi> {
    api: Arc<A>,
    session: watch::Receiver<AuthState>,
    state: watch::Sender<TransactionState>
}

impl<A: FinanceApi> TransactionStore<A> {
    pub fn new(api: Arc<A>, session: watch::Receiver<AuthState>) -> Self {
        Self {
            api,
            session,
            state: watch::Sender::new(TransactionState::default())
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TransactionState {
        self.state.borrow().clone()
    }

    /// The filtered list.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().filtered()
    }

    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.state.borrow().all.clone()
    }

    pub fn stats(&self) -> TransactionStats {
        self.state.borrow().stats()
    }

    pub fn filters(&self) -> TransactionFilter {
        self.state.borrow().filter.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Loads the list from the backend unless already loaded or loading; `force` bypasses both guards.
    ///
    /// # Errors
    /// Returns the backend failure after recording `Failed to load transactions: <reason>`.
    pub async fn fetch(&self, force: bool) -> Result<FetchOutcome, StoreError> {
        if !self.session.borrow().is_authenticated {
            debug!("User not authenticated, skipping transaction fetch");
            return Ok(FetchOutcome::Unauthenticated)
        }

        let mut skipped = None;

        self.state.send_if_modified(|state| {
            if state.loading && !force {
                skipped = Some(FetchOutcome::InProgress);
                return false
            }

            if state.has_fetched && !force {
                skipped = Some(FetchOutcome::AlreadyLoaded);
                return false
            }

            state.loading = true;
            state.error = None;
            true
        });

        if let Some(outcome) = skipped {
            return Ok(outcome)
        }

        match self.api.list_transactions().await {
            Ok(transactions) => {
                let count = transactions.len();
                info!("Fetched {count} transactions");

                self.state.send_modify(|state| {
                    state.all = transactions;
                    state.has_fetched = true;
                    state.loading = false;
                });

                Ok(FetchOutcome::Loaded { count })
            }
            Err(error) => {
                error!("Error fetching transactions: {error}");

                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to load transactions: {error}"));
                    state.loading = false;
                });

                Err(error.into())
            }
        }
    }

    pub async fn add(&self, transaction: &NewTransaction) -> Result<Transaction, StoreError> {
        transaction.validate(Utc::now())?;

        self.state.send_modify(|state| state.loading = true);
        debug!("Adding transaction: {transaction:?}");

        let result = self.api.create_transaction(transaction).await;

        self.state.send_modify(|state| {
            state.loading = false;

            match &result {
                Ok(created) => state.all.push(created.clone()),
                Err(_) => state.error = Some(ADD_FAILED.to_string())
            }
        });

        result.map_err(|error| {
            error!("Error adding transaction: {error}");
            error.into()
        })
    }

    pub async fn update(&self, id: &str, transaction: &NewTransaction) -> Result<Transaction, StoreError> {
        transaction.validate(Utc::now())?;

        self.state.send_modify(|state| state.loading = true);
        debug!("Updating transaction [{id}]: {transaction:?}");

        let result = self.api.update_transaction(id, transaction).await;

        self.state.send_modify(|state| {
            state.loading = false;

            match &result {
                Ok(updated) => {
                    for existing in state.all.iter_mut().filter(|existing| existing.id == id) {
                        *existing = updated.clone();
                    }
                }
                Err(_) => state.error = Some(UPDATE_FAILED.to_string())
            }
        });

        result.map_err(|error| {
            error!("Error updating transaction [{id}]: {error}");
            error.into()
        })
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.state.send_modify(|state| state.loading = true);
        debug!("Deleting transaction [{id}]");

        let result = self.api.delete_transaction(id).await;

        self.state.send_modify(|state| {
            state.loading = false;

            match &result {
                Ok(()) => state.all.retain(|existing| existing.id != id),
                Err(_) => state.error = Some(DELETE_FAILED.to_string())
            }
        });

        result.map_err(|error| {
            error!("Error deleting transaction [{id}]: {error}");
            error.into()
        })
    }

    pub fn update_filters(&self, update: FilterUpdate) {
        self.state.send_modify(|state| state.filter.merge(update));
    }

    pub fn reset_filters(&self) {
        self.state.send_modify(|state| state.filter = TransactionFilter::default());
    }

    /// Drops every cached record so the next fetch goes to the backend.
    pub fn clear(&self) {
        self.state.send_replace(TransactionState::default());
    }
}
