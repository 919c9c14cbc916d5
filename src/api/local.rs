use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use csv::{ReaderBuilder, Trim};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::{ApiError, FinanceApi};
use crate::models::{
    validate_password, AuthToken, Budget, Credentials, MessageResponse, NewBudget, NewTransaction, Registration,
    Transaction, User
};
use crate::storage::{Storage, TOKEN_KEY};

struct LocalAccount {
    user: User,
    password: String
}

/// In-process backend holding a single ledger in memory.
///
/// Sessions follow the same rules as the HTTP backend: the token stored under `token` must have
/// been issued by `login`, otherwise the call fails with `Unauthorized` and the stored token is
/// removed.
pub struct LocalApi<S: Storage> {
    storage: Arc<S>,
    transactions: Mutex<Vec<Transaction>>,
    budgets: Mutex<Vec<Budget>>,
    accounts: DashMap<String, LocalAccount>,
    sessions: DashMap<String, String>,
    reset_tokens: DashMap<String, String>
}

impl<S: Storage> LocalApi<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            transactions: Mutex::new(Vec::new()),
            budgets: Mutex::new(Vec::new()),
            accounts: DashMap::new(),
            sessions: DashMap::new(),
            reset_tokens: DashMap::new()
        }
    }

    /// Registers an account up front, bypassing the password rules.
    pub fn with_account(self, name: &str, email: &str, password: &str) -> Self {
        self.insert_account(name, email, password);
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions.get_mut().extend(transactions);
        self
    }

    pub fn with_budgets(mut self, budgets: Vec<Budget>) -> Self {
        self.budgets.get_mut().extend(budgets);
        self
    }

    /// The outstanding password reset token for `email`, as it would have been mailed out.
    pub fn reset_token_for(&self, email: &str) -> Option<String> {
        let email = normalize_email(email);

        self.reset_tokens.iter()
            .find(|entry| *entry.value() == email)
            .map(|entry| entry.key().clone())
    }

    fn insert_account(&self, name: &str, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.trim().to_string(),
            date: Some(Utc::now())
        };

        self.accounts.insert(normalize_email(email), LocalAccount {
            user: user.clone(),
            password: password.to_string()
        });

        user
    }

    fn authorize(&self) -> Result<String, ApiError> {
        let Some(token) = self.storage.get(TOKEN_KEY) else {
            return Err(ApiError::unauthorized("No token, authorization denied"))
        };

        match self.sessions.get(&token) {
            Some(email) => Ok(email.value().clone()),
            None => {
                self.storage.remove(TOKEN_KEY);
                Err(ApiError::unauthorized("Token is not valid"))
            }
        }
    }
}

#[async_trait]
impl<S: Storage> FinanceApi for LocalApi<S> {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.authorize()?;
        Ok(self.transactions.lock().await.clone())
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        self.authorize()?;
        transaction.validate(Utc::now()).map_err(|error| ApiError::bad_request(error.to_string()))?;

        let created = transaction.clone().into_transaction(Uuid::new_v4().to_string());
        self.transactions.lock().await.push(created.clone());

        debug!("Local transaction [{}] created", created.id);

        Ok(created)
    }

    async fn update_transaction(&self, id: &str, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        self.authorize()?;
        transaction.validate(Utc::now()).map_err(|error| ApiError::bad_request(error.to_string()))?;

        let mut transactions = self.transactions.lock().await;
        let existing = transactions.iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

        *existing = transaction.clone().into_transaction(id.to_string());

        Ok(existing.clone())
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.authorize()?;

        let mut transactions = self.transactions.lock().await;
        let before = transactions.len();
        transactions.retain(|transaction| transaction.id != id);

        if transactions.len() == before {
            return Err(ApiError::not_found("Transaction not found"))
        }

        Ok(())
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.authorize()?;
        Ok(self.budgets.lock().await.clone())
    }

    async fn create_budget(&self, budget: &NewBudget) -> Result<Budget, ApiError> {
        self.authorize()?;
        budget.validate().map_err(|error| ApiError::bad_request(error.to_string()))?;

        let created = budget.clone().into_budget(Uuid::new_v4().to_string());
        self.budgets.lock().await.push(created.clone());

        Ok(created)
    }

    async fn delete_budget(&self, id: &str) -> Result<(), ApiError> {
        self.authorize()?;

        let mut budgets = self.budgets.lock().await;
        let before = budgets.len();
        budgets.retain(|budget| budget.id != id);

        if budgets.len() == before {
            return Err(ApiError::not_found("Budget not found"))
        }

        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let email = normalize_email(&credentials.email);

        let valid = self.accounts.get(&email)
            .is_some_and(|account| account.password == credentials.password);

        if !valid {
            return Err(ApiError::bad_request("Invalid Credentials"))
        }

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), email);

        Ok(AuthToken { token })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let email = self.authorize()?;

        self.accounts.get(&email)
            .map(|account| account.user.clone())
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    async fn register(&self, registration: &Registration) -> Result<MessageResponse, ApiError> {
        registration.validate().map_err(|error| ApiError::bad_request(error.to_string()))?;

        if self.accounts.contains_key(&normalize_email(&registration.email)) {
            return Err(ApiError::bad_request("User already exists"))
        }

        let user = self.insert_account(&registration.name, &registration.email, &registration.password);
        info!("Local account [{}] registered", user.id);

        Ok(MessageResponse { message: Some("User registered".to_string()) })
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let email = normalize_email(email);

        if self.accounts.contains_key(&email) {
            self.reset_tokens.insert(Uuid::new_v4().to_string(), email);
        }

        Ok(MessageResponse { message: Some("If the account exists, a reset link has been sent".to_string()) })
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse, ApiError> {
        validate_password(password).map_err(|error| ApiError::bad_request(error.to_string()))?;

        let Some((_, email)) = self.reset_tokens.remove(token) else {
            return Err(ApiError::bad_request("Password reset token is invalid or has expired"))
        };

        let mut account = self.accounts.get_mut(&email)
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        account.password = password.to_string();

        Ok(MessageResponse { message: Some("Password has been reset".to_string()) })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reads transactions from CSV with an `id,type,amount,category,description,date` header.
///
/// Malformed rows are logged and skipped.
pub fn read_transactions<R: Read>(reader: R) -> Vec<Transaction> {
    read_records(reader)
}

/// Reads budgets from CSV with an `id,category,amount` header. Malformed rows are logged and skipped.
pub fn read_budgets<R: Read>(reader: R) -> Vec<Budget> {
    read_records(reader)
}

fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Vec<T> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();

    for result in reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(error) => error!("CSV deserialization error: {error}")
        }
    }

    records
}
