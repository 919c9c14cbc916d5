use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::select;
use tokio::spawn;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::actors::ActorHandle;
use crate::models::{calculate_spending, AlertStatus, BudgetStatus};
use crate::stores::{BudgetState, TransactionState};
use crate::types::{display_name, format_currency, format_percentage, BudgetId};

/// Emitted when a budget crosses into the warning or exceeded band.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub budget_id: BudgetId,
    pub category: String,
    pub status: AlertStatus,
    pub spent: Decimal,
    pub amount: Decimal,
    pub percentage: Decimal
}

impl From<&BudgetStatus> for BudgetAlert {
    fn from(status: &BudgetStatus) -> Self {
        Self {
            budget_id: status.budget.id.clone(),
            category: status.budget.category.clone(),
            status: status.alert_status,
            spent: status.spent,
            amount: status.budget.amount,
            percentage: status.percentage
        }
    }
}

pub struct AlertActor;

impl AlertActor {
    /// Watches both stores and reports each budget whose alert status changes into an alert band.
    ///
    /// A budget that stays in the same band does not alert again. Budgets present when the actor
    /// starts are compared against `Normal`.
    pub fn spawn(
        mut transactions: watch::Receiver<TransactionState>,
        mut budgets: watch::Receiver<BudgetState>
    ) -> (ActorHandle, mpsc::UnboundedReceiver<BudgetAlert>) {
        let (shutdown, mut shutdown_receiver) = oneshot::channel();
        let (sender, receiver) = mpsc::unbounded_channel();

        let task = spawn(async move {
            let mut previous = HashMap::<BudgetId, AlertStatus>::new();

            loop {
                let statuses = {
                    let transactions = transactions.borrow_and_update();
                    let budgets = budgets.borrow_and_update();
                    calculate_spending(&transactions.all, &budgets.budgets)
                };

                for status in &statuses {
                    let before = previous.get(&status.budget.id).copied().unwrap_or(AlertStatus::Normal);

                    if status.alert_status.is_alert() && status.alert_status != before {
                        warn!(
                            "Budget for {} is {} ({} of {}, {})",
                            display_name(&status.budget.category),
                            status.alert_status.as_str(),
                            format_currency(status.spent),
                            format_currency(status.budget.amount),
                            format_percentage(status.percentage)
                        );

                        if sender.send(BudgetAlert::from(status)).is_err() {
                            debug!("Alert receiver dropped");
                        }
                    }
                }

                previous = statuses.into_iter()
                    .map(|status| (status.budget.id, status.alert_status))
                    .collect();

                select! {
                    _ = &mut shutdown_receiver => break,
                    changed = transactions.changed() => {
                        if changed.is_err() {
                            break
                        }
                    }
                    changed = budgets.changed() => {
                        if changed.is_err() {
                            break
                        }
                    }
                }
            }

            debug!("Alert actor stopped");
        });

        (ActorHandle::new(shutdown, task), receiver)
    }
}
