use std::sync::Arc;

use tokio::select;
use tokio::spawn;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info};

use crate::actors::ActorHandle;
use crate::api::FinanceApi;
use crate::stores::{AuthState, BudgetStore, TransactionStore};

/// Keeps the data stores in step with the session.
pub struct SyncActor;

impl SyncActor {
    /// Fetches both stores whenever a session starts and clears them when it ends.
    ///
    /// Sessions are told apart by `AuthState::generation`, so a logout followed by a login that
    /// arrive as one notification still clears the previous session's data before reloading.
    pub fn spawn<A: FinanceApi>(
        mut session: watch::Receiver<AuthState>,
        transactions: Arc<TransactionStore<A>>,
        budgets: Arc<BudgetStore<A>>
    ) -> ActorHandle {
        let (shutdown, mut shutdown_receiver) = oneshot::channel();

        let task = spawn(async move {
            //NOTE: Generation of the session whose data the stores currently hold
            let mut loaded: Option<u64> = None;

            loop {
                let (generation, authenticated) = {
                    let state = session.borrow_and_update();
                    (state.generation, state.is_authenticated)
                };

                if loaded.is_some_and(|loaded| !authenticated || loaded != generation) {
                    info!("Session ended, clearing data");
                    transactions.clear();
                    budgets.clear();
                    loaded = None;
                }

                if authenticated && loaded.is_none() {
                    info!("Session started, loading data");

                    if let Err(error) = transactions.fetch(false).await {
                        error!("Initial transaction fetch failed: {error}");
                    }

                    if let Err(error) = budgets.fetch(false).await {
                        error!("Initial budget fetch failed: {error}");
                    }

                    loaded = Some(generation);
                }

                select! {
                    _ = &mut shutdown_receiver => break,
                    changed = session.changed() => {
                        if changed.is_err() {
                            break
                        }
                    }
                }
            }

            debug!("Sync actor stopped");
        });

        ActorHandle::new(shutdown, task)
    }
}
