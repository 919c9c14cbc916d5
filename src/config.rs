use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_DATA_DIR: &str = ".finance-tracker";

const STORAGE_FILE: &str = "storage.json";

/// Settings for talking to the backend and persisting the session token.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, without a trailing slash.
    pub api_url: String,
    /// Fixed per-request timeout.
    pub timeout: Duration,
    /// Directory holding the persisted key/value storage file.
    pub data_dir: PathBuf
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, timeout: Duration, data_dir: impl Into<PathBuf>) -> Self {
        let api_url = api_url.into();

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
            data_dir: data_dir.into()
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, Duration::from_millis(DEFAULT_TIMEOUT_MS), DEFAULT_DATA_DIR)
    }
}
