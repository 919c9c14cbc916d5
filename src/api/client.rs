use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::api::{ApiError, FinanceApi};
use crate::config::ClientConfig;
use crate::models::{
    AuthToken, Budget, Credentials, ForgotPassword, MessageResponse, NewBudget, NewTransaction, PasswordReset,
    Registration, Transaction, User
};
use crate::storage::{Storage, TOKEN_KEY};

/// Header carrying the session token on every request.
pub const AUTH_HEADER: &str = "x-auth-token";

/// `FinanceApi` over JSON/HTTP.
///
/// The token is read from storage per request, so a login or logout elsewhere takes effect on
/// the next call. A 401 response removes the stored token; navigating away is left to the caller.
pub struct HttpApi<S: Storage> {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<S>
}

impl<S: Storage> HttpApi<S> {
    /// # Errors
    /// Returns `ApiError::Network` if the base URL is not a usable http(s) URL or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, storage: Arc<S>) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|error| ApiError::network(format!("Invalid API URL '{}': {error}", config.api_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(ApiError::network(format!("Invalid API URL '{}'", config.api_url)))
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::network)?;

        Ok(Self {
            http,
            base_url,
            storage
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one so ids cannot change the route.
    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut url = self.base_url.clone();

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        debug!("API Request: {method} {}", url.path());

        let builder = self.http.request(method, url);

        match self.storage.get(TOKEN_KEY) {
            Some(token) => builder.header(AUTH_HEADER, token),
            None => builder
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|error| {
            error!("No response received: {error}");
            ApiError::network(error)
        })?;

        let status = response.status();

        if status.is_success() {
            return Ok(response)
        }

        let body = response.text().await.unwrap_or_default();
        error!("API Error: status {status} | {body}");

        if status == StatusCode::UNAUTHORIZED {
            warn!("Session token rejected, clearing stored token");
            self.storage.remove(TOKEN_KEY);
        }

        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request).await?
            .json()
            .await
            .map_err(ApiError::decode)
    }

    async fn send_ok(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> FinanceApi for HttpApi<S> {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.send_json(self.request(Method::GET, &["transactions"])).await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        self.send_json(self.request(Method::POST, &["transactions"]).json(transaction)).await
    }

    async fn update_transaction(&self, id: &str, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        self.send_json(self.request(Method::PUT, &["transactions", id]).json(transaction)).await
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.send_ok(self.request(Method::DELETE, &["transactions", id])).await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.send_json(self.request(Method::GET, &["budgets"])).await
    }

    async fn create_budget(&self, budget: &NewBudget) -> Result<Budget, ApiError> {
        self.send_json(self.request(Method::POST, &["budgets"]).json(budget)).await
    }

    async fn delete_budget(&self, id: &str) -> Result<(), ApiError> {
        self.send_ok(self.request(Method::DELETE, &["budgets", id])).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        self.send_json(self.request(Method::POST, &["auth"]).json(credentials)).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, &["auth"])).await
    }

    async fn register(&self, registration: &Registration) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::POST, &["users"]).json(registration)).await
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = ForgotPassword { email: email.to_string() };
        self.send_json(self.request(Method::POST, &["auth", "forgot-password"]).json(&body)).await
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse, ApiError> {
        let body = PasswordReset { token: token.to_string(), password: password.to_string() };
        self.send_json(self.request(Method::POST, &["auth", "reset-password"]).json(&body)).await
    }
}
