//! Storage abstraction for persistence.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::AutoSaveBridge;
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key/value text storage backends.
///
/// Browser local storage and the filesystem are both synchronous, so the
/// trait is too.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Store `value` under `key`, overwriting any previous value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Load the value stored under `key`.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if `key` exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Trait for key/value text storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Store `value` under `key`, overwriting any previous value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Load the value stored under `key`.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if `key` exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
