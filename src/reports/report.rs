use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionStats};
use crate::reports::grouping::Buckets;
use crate::reports::{DateRange, GroupBy, ReportError};
use crate::types::{percentage_of, total, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub range: DateRange,
    pub group_by: GroupBy,
    /// `None` keeps both income and expenses.
    pub transaction_type: Option<TransactionType>
}

impl ReportFilter {
    pub fn apply(&self, transactions: &[Transaction], now: DateTime<Utc>) -> Result<Vec<Transaction>, ReportError> {
        let (start, end) = self.range.bounds(now)?;

        Ok(transactions.iter()
            .filter(|transaction| transaction.date >= start && transaction.date <= end)
            .filter(|transaction| self.transaction_type.is_none_or(|kind| transaction.transaction_type == kind))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: Decimal,
    /// Share of the breakdown total.
    pub percentage: Decimal
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeExpenseEntry {
    pub name: String,
    pub income: Decimal,
    pub expense: Decimal
}

/// Expense totals per group. Groups that do not total above zero are dropped.
pub fn expense_breakdown(transactions: &[Transaction], group_by: GroupBy) -> Vec<BreakdownEntry> {
    let mut buckets = Buckets::<Decimal>::new(group_by);

    for transaction in transactions.iter().filter(|transaction| transaction.transaction_type == TransactionType::Expense) {
        let value = buckets.entry(transaction);
        *value = value.saturating_add(transaction.amount);
    }

    let totals: Vec<(String, Decimal)> = buckets.into_sorted().into_iter()
        .filter(|(_, value)| *value > Decimal::ZERO)
        .collect();
    let breakdown_total = total(totals.iter().map(|(_, value)| *value));

    totals.into_iter()
        .map(|(name, value)| BreakdownEntry {
            name,
            value,
            percentage: percentage_of(value, breakdown_total)
        })
        .collect()
}

pub fn income_vs_expense(transactions: &[Transaction], group_by: GroupBy) -> Vec<IncomeExpenseEntry> {
    let mut buckets = Buckets::<(Decimal, Decimal)>::new(group_by);

    for transaction in transactions {
        let (income, expense) = buckets.entry(transaction);

        match transaction.transaction_type {
            TransactionType::Income => *income = income.saturating_add(transaction.amount),
            TransactionType::Expense => *expense = expense.saturating_add(transaction.amount)
        }
    }

    buckets.into_sorted().into_iter()
        .map(|(name, (income, expense))| IncomeExpenseEntry { name, income, expense })
        .collect()
}

/// Everything the reports view shows for one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub transactions: Vec<Transaction>,
    pub stats: TransactionStats,
    pub expense_breakdown: Vec<BreakdownEntry>,
    pub income_vs_expense: Vec<IncomeExpenseEntry>
}

impl Report {
    pub fn build(transactions: &[Transaction], filter: &ReportFilter, now: DateTime<Utc>) -> Result<Self, ReportError> {
        let transactions = filter.apply(transactions, now)?;

        Ok(Self {
            stats: TransactionStats::from_transactions(&transactions),
            expense_breakdown: expense_breakdown(&transactions, filter.group_by),
            income_vs_expense: income_vs_expense(&transactions, filter.group_by),
            transactions
        })
    }
}
