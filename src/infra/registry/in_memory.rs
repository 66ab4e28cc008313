// In-memory implementation of RegistryStore.
//
// Used by the test suites across core, and handy for running the bot
// without persistence. Follows the same contract as the JSON-backed store:
// get-by-key, whole-record upsert, full scan.

use crate::core::registry::{ModeratorRecord, RegistryError, RegistryStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed store: safe for concurrent readers while a writer
/// replaces whole records.
pub struct InMemoryRegistryStore {
    records: DashMap<u64, ModeratorRecord>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl Default for InMemoryRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn get(&self, user_id: u64) -> Result<Option<ModeratorRecord>, RegistryError> {
        Ok(self.records.get(&user_id).map(|r| r.clone()))
    }

    async fn upsert(&self, record: ModeratorRecord) -> Result<(), RegistryError> {
        self.records.insert(record.user_id, record);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ModeratorRecord>, RegistryError> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }
}
