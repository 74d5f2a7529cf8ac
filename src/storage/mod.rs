//! Persisted key-value storage for the session token and user record.
//!
//! The coordinator and the HTTP client only see the [`KeyValueStore`] trait;
//! the backing mechanism (keychain, file, memory) is opaque to them. Values are
//! stored verbatim and must never be logged since the token entry is a bearer
//! credential.

use std::future::Future;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Key holding the JSON-encoded user record.
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
