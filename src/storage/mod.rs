mod errors;
mod local_storage;

pub use errors::StorageError;
pub use local_storage::LocalStorage;

/// Key the session token is persisted under.
pub const TOKEN_KEY: &str = "token";
/// Key of the cached user profile, removed together with the token on logout.
pub const USER_KEY: &str = "user";

/// String key/value store with browser local-storage semantics: writes never fail from the
/// caller's point of view and a missing key is simply absent.
pub trait Storage: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
