//! Autosave of the live snapshot.
//!
//! Every history push is mirrored to a single fixed key so the last state
//! survives a reload. Failures are logged and otherwise ignored.

use crate::history::Snapshot;
use crate::storage::Storage;
use std::sync::Arc;

/// Writes the latest snapshot to storage and reads it back on startup.
#[derive(Clone)]
pub struct AutoSaveBridge {
    storage: Arc<dyn Storage>,
    key: String,
}

impl AutoSaveBridge {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Overwrite the stored snapshot. Returns whether the write succeeded.
    pub fn persist(&self, snapshot: &Snapshot) -> bool {
        match self.storage.save(&self.key, snapshot.as_str()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Autosave to '{}' failed: {}", self.key, e);
                false
            }
        }
    }

    /// The stored snapshot, if any.
    pub fn restore(&self) -> Option<Snapshot> {
        match self.storage.load(&self.key) {
            Ok(text) => Some(Snapshot::new(text)),
            Err(crate::storage::StorageError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Autosave restore from '{}' failed: {}", self.key, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for AutoSaveBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaveBridge").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError, StorageResult};

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn save(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io("quota exceeded".to_string()))
        }
        fn load(&self, _key: &str) -> StorageResult<String> {
            Err(StorageError::Io("denied".to_string()))
        }
        fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
        fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_persist_and_restore() {
        let storage = Arc::new(MemoryStorage::new());
        let bridge = AutoSaveBridge::new(storage.clone(), "bonkverseSkinEditor");
        assert!(bridge.restore().is_none());

        assert!(bridge.persist(&Snapshot::new("{\"nodes\":[]}")));
        assert!(bridge.persist(&Snapshot::new("{\"nodes\":[1]}")));
        assert_eq!(bridge.restore(), Some(Snapshot::new("{\"nodes\":[1]}")));

        assert_eq!(storage.load("bonkverseSkinEditor").unwrap(), "{\"nodes\":[1]}");
    }

    #[test]
    fn test_failures_are_swallowed() {
        let bridge = AutoSaveBridge::new(Arc::new(BrokenStorage), "k");
        assert!(!bridge.persist(&Snapshot::new("{}")));
        assert!(bridge.restore().is_none());
    }
}
