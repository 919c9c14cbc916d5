use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, ValidationError};
use crate::types::{percentage_of, total, BudgetId, TransactionType};

const WARNING_THRESHOLD: Decimal = Decimal::from_parts(85, 0, 0, false, 0);
const EXCEEDED_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// A spending ceiling assigned to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "_id", alias = "id")]
    pub id: BudgetId,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal
}

impl NewBudget {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory)
        }

        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount)
        }

        Ok(())
    }

    pub fn into_budget(self, id: BudgetId) -> Budget {
        Budget {
            id,
            category: self.category,
            amount: self.amount
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Normal,
    Warning,
    Exceeded
}

impl AlertStatus {
    /// Classifies an unclamped spend-to-budget percentage.
    pub fn from_percentage(percentage: Decimal) -> Self {
        if percentage >= EXCEEDED_THRESHOLD {
            AlertStatus::Exceeded
        } else if percentage >= WARNING_THRESHOLD {
            AlertStatus::Warning
        } else {
            AlertStatus::Normal
        }
    }

    pub fn is_alert(&self) -> bool {
        *self != AlertStatus::Normal
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Normal => "normal",
            AlertStatus::Warning => "warning",
            AlertStatus::Exceeded => "exceeded"
        }
    }
}

/// A budget enriched with spend data derived from the current transactions.
///
/// Never persisted. `percentage` is clamped to `[0, 100]` for display while `alert_status`
/// is classified from the unclamped value, and `remaining` may be negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub alert_status: AlertStatus
}

impl BudgetStatus {
    pub fn new(budget: Budget, spent: Decimal) -> Self {
        let raw_percentage = percentage_of(spent, budget.amount);
        let remaining = budget.amount.saturating_sub(spent);

        Self {
            percentage: raw_percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
            alert_status: AlertStatus::from_percentage(raw_percentage),
            remaining,
            spent,
            budget
        }
    }
}

/// Joins expense totals per lower-cased category against each budget's lower-cased category.
///
/// Runs in O(transactions + budgets). Budgets with no matching expenses report zero spent.
pub fn calculate_spending(transactions: &[Transaction], budgets: &[Budget]) -> Vec<BudgetStatus> {
    let mut spending: HashMap<String, Decimal> = HashMap::new();

    let expenses = transactions.iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
        .filter(|transaction| !transaction.category.is_empty());

    for transaction in expenses {
        let spent = spending.entry(transaction.category.to_lowercase()).or_default();
        *spent = spent.saturating_add(transaction.amount);
    }

    budgets.iter()
        .map(|budget| {
            let spent = spending.get(&budget.category.to_lowercase()).copied().unwrap_or_default();
            BudgetStatus::new(budget.clone(), spent)
        })
        .collect()
}

/// Totals across every budget plus the budgets currently in an alert state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetOverview {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub utilization: Decimal,
    pub alerts: Vec<BudgetStatus>
}

impl BudgetOverview {
    pub fn from_statuses(statuses: &[BudgetStatus]) -> Self {
        let total_budget = total(statuses.iter().map(|status| status.budget.amount));
        let total_spent = total(statuses.iter().map(|status| status.spent));

        Self {
            total_budget,
            total_spent,
            remaining: total_budget.saturating_sub(total_spent),
            utilization: percentage_of(total_spent, total_budget),
            alerts: statuses.iter()
                .filter(|status| status.alert_status.is_alert())
                .cloned()
                .collect()
        }
    }
}
