// Chat registration service - who moderates which chats, with per-chat
// feature settings. Storage goes through the RegistryStore port; this layer
// enforces the record invariants (manual-ban permission only on registered
// chats, unregister strips all per-chat state).

use super::registry_models::ModeratorRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Chat is not registered")]
    ChatNotRegistered,
}

/// Port for persisting moderator registration records.
///
/// The contract is read-then-write-whole-record: the store only needs
/// get-by-key, whole-record upsert and a full scan. Reads may run
/// concurrently with a writer.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn get(&self, user_id: u64) -> Result<Option<ModeratorRecord>, RegistryError>;

    async fn upsert(&self, record: ModeratorRecord) -> Result<(), RegistryError>;

    async fn all(&self) -> Result<Vec<ModeratorRecord>, RegistryError>;
}

/// Registration service over an injected store.
pub struct RegistryService<S: RegistryStore> {
    store: S,
}

impl<S: RegistryStore> RegistryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a chat for a moderator, creating their record on first use.
    /// Admin-rights verification happens at the command layer before this
    /// call. Idempotent.
    pub async fn register_chat(&self, user_id: u64, chat_id: i64) -> Result<(), RegistryError> {
        let mut record = self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| ModeratorRecord::new(user_id));
        record.add_chat(chat_id);
        self.store.upsert(record).await
    }

    /// Remove a chat from a moderator's record, including its settings and
    /// manual-ban permission.
    pub async fn unregister_chat(&self, user_id: u64, chat_id: i64) -> Result<(), RegistryError> {
        let mut record = self
            .store
            .get(user_id)
            .await?
            .ok_or(RegistryError::ChatNotRegistered)?;
        if !record.remove_chat(chat_id) {
            return Err(RegistryError::ChatNotRegistered);
        }
        self.store.upsert(record).await
    }

    pub async fn record_of(&self, user_id: u64) -> Result<Option<ModeratorRecord>, RegistryError> {
        self.store.get(user_id).await
    }

    /// Toggle status-message auto-deletion for a registered chat.
    pub async fn set_status_delete(
        &self,
        user_id: u64,
        chat_id: i64,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        let mut record = self.registered_record(user_id, chat_id).await?;
        record.set_status_delete(chat_id, enabled);
        self.store.upsert(record).await
    }

    /// Grant the manual /ban vote on a registered chat.
    pub async fn allow_manual_ban(&self, user_id: u64, chat_id: i64) -> Result<(), RegistryError> {
        let mut record = self.registered_record(user_id, chat_id).await?;
        record.allow_manual_ban(chat_id);
        self.store.upsert(record).await
    }

    /// Revoke the manual /ban vote. Returns false when it was already off.
    pub async fn revoke_manual_ban(
        &self,
        user_id: u64,
        chat_id: i64,
    ) -> Result<bool, RegistryError> {
        let mut record = self.registered_record(user_id, chat_id).await?;
        let changed = record.revoke_manual_ban(chat_id);
        if changed {
            self.store.upsert(record).await?;
        }
        Ok(changed)
    }

    /// Whether this moderator may start a ban vote in this chat.
    pub async fn manual_ban_enabled(
        &self,
        user_id: u64,
        chat_id: i64,
    ) -> Result<bool, RegistryError> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .map(|r| r.manual_ban_enabled(chat_id))
            .unwrap_or(false))
    }

    /// Every moderator watching a chat - the notification fan-out list.
    pub async fn watchers_of(&self, chat_id: i64) -> Result<Vec<ModeratorRecord>, RegistryError> {
        Ok(self
            .store
            .all()
            .await?
            .into_iter()
            .filter(|r| r.watches(chat_id))
            .collect())
    }

    async fn registered_record(
        &self,
        user_id: u64,
        chat_id: i64,
    ) -> Result<ModeratorRecord, RegistryError> {
        let record = self
            .store
            .get(user_id)
            .await?
            .ok_or(RegistryError::ChatNotRegistered)?;
        if !record.watches(chat_id) {
            return Err(RegistryError::ChatNotRegistered);
        }
        Ok(record)
    }
}
