use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::models::Transaction;
use crate::types::ParseError;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    #[default]
    Category,
    /// `Apr 2025`
    Month,
    /// `Apr 10, 2025`
    Day
}

impl GroupBy {
    pub fn key(&self, transaction: &Transaction) -> String {
        match self {
            GroupBy::Category => {
                let category = transaction.category.trim();

                if category.is_empty() {
                    UNCATEGORIZED.to_string()
                } else {
                    category.to_string()
                }
            }
            GroupBy::Month => transaction.date.format("%b %Y").to_string(),
            GroupBy::Day => transaction.date.format("%b %-d, %Y").to_string()
        }
    }

    /// First day of the bucket a transaction falls in. `None` for category grouping, which has no order.
    pub(crate) fn period(&self, transaction: &Transaction) -> Option<NaiveDate> {
        let date = transaction.date.date_naive();

        match self {
            GroupBy::Category => None,
            GroupBy::Month => date.with_day(1),
            GroupBy::Day => Some(date)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Category => "category",
            GroupBy::Month => "month",
            GroupBy::Day => "day"
        }
    }
}

impl FromStr for GroupBy {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "category" => Ok(GroupBy::Category),
            "month" => Ok(GroupBy::Month),
            "day" => Ok(GroupBy::Day),
            _ => Err(ParseError::GroupBy(value.to_string()))
        }
    }
}

impl Display for GroupBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulates values per group key, remembering first-seen order and each bucket's period.
pub(crate) struct Buckets<T> {
    group_by: GroupBy,
    entries: Vec<(String, Option<NaiveDate>, T)>
}

impl<T: Default> Buckets<T> {
    pub(crate) fn new(group_by: GroupBy) -> Self {
        Self { group_by, entries: Vec::new() }
    }

    pub(crate) fn entry(&mut self, transaction: &Transaction) -> &mut T {
        let key = self.group_by.key(transaction);

        let index = match self.entries.iter().position(|(existing, _, _)| *existing == key) {
            Some(index) => index,
            None => {
                self.entries.push((key, self.group_by.period(transaction), T::default()));
                self.entries.len() - 1
            }
        };

        &mut self.entries[index].2
    }

    /// Time buckets come out chronologically, category buckets in first-seen order.
    pub(crate) fn into_sorted(mut self) -> Vec<(String, T)> {
        if self.group_by != GroupBy::Category {
            self.entries.sort_by_key(|(_, period, _)| *period);
        }

        self.entries.into_iter()
            .map(|(key, _, value)| (key, value))
            .collect()
    }
}
