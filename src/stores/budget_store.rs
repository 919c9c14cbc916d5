use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::FinanceApi;
use crate::models::{calculate_spending, Budget, BudgetOverview, BudgetStatus, NewBudget, Transaction};
use crate::stores::{AuthState, FetchOutcome, StoreError, TransactionState};

const LOAD_FAILED: &str = "Failed to load budgets";
const ADD_FAILED: &str = "Failed to add budget";
const DELETE_FAILED: &str = "Failed to delete budget";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetState {
    pub budgets: Vec<Budget>,
    pub loading: bool,
    pub has_fetched: bool,
    pub error: Option<String>
}

/// Caches budgets and enriches them with spend data from the transaction store.
///
/// Spend is derived on every read from the transaction store's full (unfiltered) list, so the
/// enriched view is never stale and never persisted.
pub struct BudgetStore<A: FinanceApi> {
    api: Arc<A>,
    session: watch::Receiver<AuthState>,
    transactions: watch::Receiver<TransactionState>,
    state: watch::Sender<BudgetState>
}

impl<A: FinanceApi> BudgetStore<A> {
    pub fn new(api: Arc<A>, session: watch::Receiver<AuthState>, transactions: watch::Receiver<TransactionState>) -> Self {
        Self {
            api,
            session,
            transactions,
            state: watch::Sender::new(BudgetState::default())
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BudgetState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> BudgetState {
        self.state.borrow().clone()
    }

    /// Budgets enriched with `spent`, `percentage`, `remaining` and `alert_status`.
    pub fn budgets(&self) -> Vec<BudgetStatus> {
        let transactions = self.transactions.borrow();
        let state = self.state.borrow();

        calculate_spending(&transactions.all, &state.budgets)
    }

    pub fn raw_budgets(&self) -> Vec<Budget> {
        self.state.borrow().budgets.clone()
    }

    pub fn overview(&self) -> BudgetOverview {
        BudgetOverview::from_statuses(&self.budgets())
    }

    /// Budgets in the warning or exceeded state.
    pub fn alerts(&self) -> Vec<BudgetStatus> {
        self.overview().alerts
    }

    /// Enriches arbitrary budgets against arbitrary transactions.
    pub fn calculate_spending(&self, transactions: &[Transaction], budgets: &[Budget]) -> Vec<BudgetStatus> {
        calculate_spending(transactions, budgets)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Same guard semantics as `TransactionStore::fetch`.
    pub async fn fetch(&self, force: bool) -> Result<FetchOutcome, StoreError> {
        if !self.session.borrow().is_authenticated {
            debug!("User not authenticated, skipping budget fetch");
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

        match self.api.list_budgets().await {
            Ok(budgets) => {
                let count = budgets.len();
                info!("Fetched {count} budgets");

                self.state.send_modify(|state| {
                    state.budgets = budgets;
                    state.has_fetched = true;
                    state.loading = false;
                });

                Ok(FetchOutcome::Loaded { count })
            }
            Err(error) => {
                error!("Error fetching budgets: {error}");

                self.state.send_modify(|state| {
                    state.error = Some(LOAD_FAILED.to_string());
                    state.loading = false;
                });

                Err(error.into())
            }
        }
    }

    /// Creates a budget for a category that does not have one yet.
    ///
    /// # Errors
    /// `StoreError::DuplicateBudget` if a budget for the category (compared case-insensitively)
    /// already exists locally; nothing is sent in that case.
    pub async fn add(&self, budget: &NewBudget) -> Result<Budget, StoreError> {
        budget.validate()?;

        let category = budget.category.to_lowercase();
        let exists = self.state.borrow().budgets.iter()
            .any(|existing| existing.category.to_lowercase() == category);

        if exists {
            return Err(StoreError::duplicate_budget(&budget.category))
        }

        self.state.send_modify(|state| state.loading = true);
        debug!("Adding budget: {budget:?}");

        let result = self.api.create_budget(budget).await;

        self.state.send_modify(|state| {
            state.loading = false;

            match &result {
                Ok(created) => state.budgets.push(created.clone()),
                Err(error) => state.error = Some(error.server_message().unwrap_or(ADD_FAILED).to_string())
            }
        });

        result.map_err(|error| {
            error!("Error adding budget: {error}");
            error.into()
        })
    }

    /// Deletes one budget and removes exactly that id from the local list.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.state.send_modify(|state| state.loading = true);
        debug!("Deleting budget [{id}]");

        let result = self.api.delete_budget(id).await;

        self.state.send_modify(|state| {
            state.loading = false;

            match &result {
                Ok(()) => state.budgets.retain(|existing| existing.id != id),
                Err(_) => state.error = Some(DELETE_FAILED.to_string())
            }
        });

        result.map_err(|error| {
            error!("Error deleting budget [{id}]: {error}");
            error.into()
        })
    }

    pub fn clear(&self) {
        self.state.send_replace(BudgetState::default());
    }
}
