mod client;
mod errors;
mod local;

use async_trait::async_trait;

use crate::models::{AuthToken, Budget, Credentials, MessageResponse, NewBudget, NewTransaction, Registration, Transaction, User};

pub use client::{HttpApi, AUTH_HEADER};
pub use errors::ApiError;
pub use local::{read_budgets, read_transactions, LocalApi};

/// The REST backend as seen by the stores.
///
/// Every call is authenticated with the session token held in storage, except `login`,
/// `register`, `forgot_password` and `reset_password`.
#[async_trait]
pub trait FinanceApi: Send + Sync + 'static {
    /// `GET /transactions`
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError>;
    /// `POST /transactions`
    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError>;
    /// `PUT /transactions/{id}`
    async fn update_transaction(&self, id: &str, transaction: &NewTransaction) -> Result<Transaction, ApiError>;
    /// `DELETE /transactions/{id}`
    async fn delete_transaction(&self, id: &str) -> Result<(), ApiError>;

    /// `GET /budgets`
    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError>;
    /// `POST /budgets`
    async fn create_budget(&self, budget: &NewBudget) -> Result<Budget, ApiError>;
    /// `DELETE /budgets/{id}`
    async fn delete_budget(&self, id: &str) -> Result<(), ApiError>;

    /// `POST /auth`
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError>;
    /// `GET /auth`
    async fn current_user(&self) -> Result<User, ApiError>;
    /// `POST /users`
    async fn register(&self, registration: &Registration) -> Result<MessageResponse, ApiError>;
    /// `POST /auth/forgot-password`
    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError>;
    /// `POST /auth/reset-password`
    async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse, ApiError>;
}
