use thiserror::Error;

use crate::api::ApiError;
use crate::models::ValidationError;
use crate::types::display_name;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A budget already exists for {name}")]
    DuplicateBudget {
        category: String,
        name: String
    }
}

impl StoreError {
    pub fn duplicate_budget(category: &str) -> Self {
        Self::DuplicateBudget {
            category: category.to_string(),
            name: display_name(category)
        }
    }
}
