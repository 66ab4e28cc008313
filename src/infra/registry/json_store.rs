// JSON-file implementation of RegistryStore.
//
// One pretty-printed document mapping moderator id -> record, loaded into an
// in-process cache at startup and rewritten whole on every mutation. The
// registry is read far more often than written, so reads never touch disk.

use crate::core::registry::{ModeratorRecord, RegistryError, RegistryStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

pub struct JsonRegistryStore {
    path: PathBuf,
    cache: RwLock<HashMap<u64, ModeratorRecord>>,
}

impl JsonRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = if path.exists() {
            let file = std::fs::File::open(&path).expect("Failed to open registry file");
            let map: HashMap<u64, ModeratorRecord> =
                serde_json::from_reader(file).unwrap_or_default();
            RwLock::new(map)
        } else {
            RwLock::new(HashMap::new())
        };

        Self { path, cache }
    }

    async fn persist(&self) -> Result<(), RegistryError> {
        let cache = self.cache.read().await;
        let file = std::fs::File::create(&self.path)
            .map_err(|e| RegistryError::StorageError(e.to_string()))?;
        serde_json::to_writer_pretty(file, &*cache)
            .map_err(|e| RegistryError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RegistryStore for JsonRegistryStore {
    async fn get(&self, user_id: u64) -> Result<Option<ModeratorRecord>, RegistryError> {
        let cache = self.cache.read().await;
        Ok(cache.get(&user_id).cloned())
    }

    async fn upsert(&self, record: ModeratorRecord) -> Result<(), RegistryError> {
        let mut cache = self.cache.write().await;
        cache.insert(record.user_id, record);
        drop(cache); // Release lock before persisting
        self.persist().await
    }

    async fn all(&self) -> Result<Vec<ModeratorRecord>, RegistryError> {
        let cache = self.cache.read().await;
        Ok(cache.values().cloned().collect())
    }
}
