use crate::types::TransactionType;

/// An entry of the fixed category catalog offered when recording transactions and budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: TransactionType
}

const fn income(id: &'static str, name: &'static str) -> Category {
    Category { id, name, kind: TransactionType::Income }
}

const fn expense(id: &'static str, name: &'static str) -> Category {
    Category { id, name, kind: TransactionType::Expense }
}

pub static INCOME_CATEGORIES: [Category; 5] = [
    income("salary", "Salary"),
    income("business", "Business"),
    income("investment", "Investment"),
    income("gift", "Gift"),
    income("other_income", "Other")
];

pub static EXPENSE_CATEGORIES: [Category; 12] = [
    expense("food", "Food & Dining"),
    expense("transportation", "Transportation"),
    expense("housing", "Housing"),
    expense("utilities", "Utilities"),
    expense("entertainment", "Entertainment"),
    expense("shopping", "Shopping"),
    expense("health", "Health"),
    expense("education", "Education"),
    expense("personal", "Personal Care"),
    expense("travel", "Travel"),
    expense("debt", "Debt Payments"),
    expense("other_expense", "Other")
];

/// Finds a catalog entry by id, ignoring ASCII case.
pub fn lookup(id: &str) -> Option<&'static Category> {
    INCOME_CATEGORIES.iter()
        .chain(EXPENSE_CATEGORIES.iter())
        .find(|category| category.id.eq_ignore_ascii_case(id.trim()))
}

/// Human readable name for a category id. Ids outside the catalog are returned as-is.
pub fn display_name(id: &str) -> String {
    lookup(id).map(|category| category.name.to_string())
        .unwrap_or_else(|| id.to_string())
}
