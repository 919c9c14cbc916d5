use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::{ApiError, FinanceApi};
use crate::models::{validate_password, Credentials, MessageResponse, Registration, User};
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};
use crate::stores::StoreError;

pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please check your email to verify your account.";

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const FORGOT_PASSWORD_FAILED: &str = "Failed to send password reset email";
const FORGOT_PASSWORD_SENT: &str = "Password reset instructions have been sent to your email";
const RESET_PASSWORD_FAILED: &str = "Failed to reset password";
const RESET_PASSWORD_DONE: &str = "Your password has been reset";

/// Session state observed by the data stores.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// True until the initial `check_auth` completes, and while a request is in flight.
    pub loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    /// Bumped every time a session starts or ends, so observers can tell sessions apart even
    /// when several changes are seen at once.
    pub generation: u64
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: true,
            error: None,
            success_message: None,
            generation: 0
        }
    }
}

/// Holds the current user and persists the session token.
pub struct AuthStore<A: FinanceApi, S: Storage> {
    api: Arc<A>,
    storage: Arc<S>,
    state: watch::Sender<AuthState>
}

impl<A: FinanceApi, S: Storage> AuthStore<A, S> {
    pub fn new(api: Arc<A>, storage: Arc<S>) -> Self {
        Self {
            api,
            storage,
            state: watch::Sender::new(AuthState::default())
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn success_message(&self) -> Option<String> {
        self.state.borrow().success_message.clone()
    }

    /// Restores a session from a stored token. A rejected token is removed.
    pub async fn check_auth(&self) -> bool {
        if self.storage.get(TOKEN_KEY).is_none() {
            self.state.send_modify(|state| state.loading = false);
            return false
        }

        match self.api.current_user().await {
            Ok(user) => {
                debug!("Session restored for user [{}]", user.id);
                self.sign_in(user);
                true
            }
            Err(error) => {
                error!("Auth check failed: {error}");
                self.storage.remove(TOKEN_KEY);
                self.state.send_modify(|state| {
                    state.user = None;
                    state.is_authenticated = false;
                    state.loading = false;
                });
                false
            }
        }
    }

    /// # Errors
    /// Returns the backend failure. The store's `error` carries the server message or `Login failed`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        self.begin();

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string()
        };

        match self.authenticate(&credentials).await {
            Ok(user) => {
                info!("User [{}] logged in", user.id);
                self.sign_in(user.clone());
                Ok(user)
            }
            Err(error) => {
                error!("Login error: {error}");
                self.storage.remove(TOKEN_KEY);
                self.fail(error.server_message().unwrap_or(LOGIN_FAILED));
                Err(error.into())
            }
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<MessageResponse, StoreError> {
        self.begin();

        if let Err(error) = registration.validate() {
            self.fail(&error.to_string());
            return Err(error.into())
        }

        match self.api.register(registration).await {
            Ok(response) => {
                self.succeed(REGISTRATION_SUCCESS);
                Ok(response)
            }
            Err(error) => {
                error!("Registration error: {error}");
                self.fail(error.server_message().unwrap_or(REGISTRATION_FAILED));
                Err(error.into())
            }
        }
    }

    pub fn logout(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);

        self.state.send_modify(|state| {
            *state = AuthState {
                loading: false,
                generation: state.generation.wrapping_add(1),
                ..AuthState::default()
            };
        });
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, StoreError> {
        self.begin();

        match self.api.forgot_password(email.trim()).await {
            Ok(response) => {
                self.succeed(response.message.as_deref().unwrap_or(FORGOT_PASSWORD_SENT));
                Ok(response)
            }
            Err(error) => {
                error!("Forgot password error: {error}");
                self.fail(error.server_message().unwrap_or(FORGOT_PASSWORD_FAILED));
                Err(error.into())
            }
        }
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse, StoreError> {
        self.begin();

        if let Err(error) = validate_password(password) {
            self.fail(&error.to_string());
            return Err(error.into())
        }

        match self.api.reset_password(token, password).await {
            Ok(response) => {
                self.succeed(response.message.as_deref().unwrap_or(RESET_PASSWORD_DONE));
                Ok(response)
            }
            Err(error) => {
                error!("Reset password error: {error}");
                self.fail(error.server_message().unwrap_or(RESET_PASSWORD_FAILED));
                Err(error.into())
            }
        }
    }

    pub fn reset_messages(&self) {
        self.state.send_modify(|state| {
            state.error = None;
            state.success_message = None;
        });
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let token = self.api.login(credentials).await?;

        if token.token.is_empty() {
            return Err(ApiError::decode("No token received"))
        }

        self.storage.set(TOKEN_KEY, &token.token);

        let user = self.api.current_user().await?;

        if let Ok(profile) = serde_json::to_string(&user) {
            self.storage.set(USER_KEY, &profile);
        }

        Ok(user)
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.error = None;
            state.success_message = None;
            state.loading = true;
        });
    }

    fn sign_in(&self, user: User) {
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.is_authenticated = true;
            state.loading = false;
            state.generation = state.generation.wrapping_add(1);
        });
    }

    fn succeed(&self, message: &str) {
        self.state.send_modify(|state| {
            state.success_message = Some(message.to_string());
            state.loading = false;
        });
    }

    fn fail(&self, message: &str) {
        self.state.send_modify(|state| {
            state.error = Some(message.to_string());
            state.success_message = None;
            state.loading = false;
        });
    }
}
