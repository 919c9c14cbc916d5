use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Transaction;
use crate::types::{percentage_of, TransactionType};

/// Aggregate figures over a set of transactions.
///
/// `balance` is always `income - expenses`; `savings_rate` is the balance as a percentage of
/// income, or zero when there is no income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransactionStats {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub savings_rate: Decimal
}

impl TransactionStats {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;

        for transaction in transactions {
            match transaction.transaction_type {
                TransactionType::Income => income = income.saturating_add(transaction.amount),
                TransactionType::Expense => expenses = expenses.saturating_add(transaction.amount)
            }
        }

        let balance = income.saturating_sub(expenses);

        Self {
            income,
            expenses,
            balance,
            savings_rate: percentage_of(balance, income)
        }
    }
}
