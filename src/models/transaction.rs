use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ValidationError;
use crate::types::{TransactionId, TransactionType};

pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// A single recorded income or expense event, as returned by the backend.
///
/// The same shape is used for offline CSV imports, where the id column may be named `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", alias = "id")]
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Category id from the catalog, or free text for legacy records.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>
}

/// Create and update payload for a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: DateTime<Utc>
}

impl NewTransaction {
    /// Checks the payload against the form rules.
    ///
    /// # Errors
    /// Returns the first violated rule: non-positive amount, missing or overlong description,
    /// missing category, or a date after `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount)
        }

        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription)
        }

        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::DescriptionTooLong { max: MAX_DESCRIPTION_LENGTH })
        }

        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory)
        }

        if self.date > now {
            return Err(ValidationError::FutureDate)
        }

        Ok(())
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date
        }
    }
}
