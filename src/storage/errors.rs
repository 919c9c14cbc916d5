use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Io(#[from] io::Error),
    #[error("Storage error: file is not a valid key/value document: {0}")]
    Corrupt(#[from] serde_json::Error)
}
