use chrono::{DateTime, Utc};

use crate::models::Transaction;
use crate::types::TransactionType;

/// Transient filter state for the transaction list. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive substring matched against the description or the category.
    pub search_query: String,
    pub transaction_type: Option<TransactionType>,
    /// Exact category match.
    pub category: Option<String>,
    /// Inclusive lower bound.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end_date: Option<DateTime<Utc>>
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_search(transaction)
            && self.transaction_type.is_none_or(|kind| transaction.transaction_type == kind)
            && self.category.as_ref().is_none_or(|category| transaction.category == *category)
            && self.start_date.is_none_or(|start| transaction.date >= start)
            && self.end_date.is_none_or(|end| transaction.date <= end)
    }

    /// Returns the matching transactions in their original order.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions.iter()
            .filter(|transaction| self.matches(transaction))
            .cloned()
            .collect()
    }

    /// Overwrites only the fields present in `update`.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(search_query) = update.search_query {
            self.search_query = search_query;
        }
        if let Some(transaction_type) = update.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TransactionFilter::default()
    }

    fn matches_search(&self, transaction: &Transaction) -> bool {
        if self.search_query.is_empty() {
            return true
        }

        let query = self.search_query.to_lowercase();

        transaction.description.to_lowercase().contains(&query)
            || transaction.category.to_lowercase().contains(&query)
    }
}

/// A partial filter change. `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub search_query: Option<String>,
    pub transaction_type: Option<Option<TransactionType>>,
    pub category: Option<Option<String>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn transaction_type(mut self, transaction_type: Option<TransactionType>) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn start_date(mut self, start_date: Option<DateTime<Utc>>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn end_date(mut self, end_date: Option<DateTime<Utc>>) -> Self {
        self.end_date = Some(end_date);
        self
    }
}
