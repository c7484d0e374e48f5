//! Browser `localStorage` backend for WASM.

use super::{Storage, StorageError, StorageResult};

/// Storage backed by `window.localStorage`.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backend(&self) -> StorageResult<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend()?
            .set_item(key, value)
            .map_err(|e| StorageError::Io(format!("setItem failed: {:?}", e)))
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        self.backend()?
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("getItem failed: {:?}", e)))?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.backend()?
            .remove_item(key)
            .map_err(|e| StorageError::Io(format!("removeItem failed: {:?}", e)))
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let value = self
            .backend()?
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("getItem failed: {:?}", e)))?;
        Ok(value.is_some())
    }
}
