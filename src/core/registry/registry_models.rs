// Registration domain models.
//
// The persisted JSON shape is kept byte-compatible with the previous
// deployment's database: `delete_statuses` keys are stringified chat ids and
// the two optional collections default to empty when a legacy record
// predates them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One moderator's registration record: the chats they administer plus
/// per-chat feature settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeratorRecord {
    pub user_id: u64,
    /// Chats this moderator registered (order irrelevant).
    pub chats: Vec<i64>,
    /// Per-chat status-message auto-delete flag, keyed by stringified chat id.
    #[serde(default)]
    pub delete_statuses: HashMap<String, bool>,
    /// Chats where this moderator enabled the manual /ban vote.
    /// Invariant: always a subset of `chats`.
    #[serde(default)]
    pub manual_ban_allowed: Vec<i64>,
}

impl ModeratorRecord {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            chats: Vec::new(),
            delete_statuses: HashMap::new(),
            manual_ban_allowed: Vec::new(),
        }
    }

    pub fn watches(&self, chat_id: i64) -> bool {
        self.chats.contains(&chat_id)
    }

    /// Register a chat; settings start disabled. Idempotent.
    pub fn add_chat(&mut self, chat_id: i64) {
        if !self.chats.contains(&chat_id) {
            self.chats.push(chat_id);
        }
        self.delete_statuses
            .entry(chat_id.to_string())
            .or_insert(false);
    }

    /// Unregister a chat, stripping it from every per-chat collection so the
    /// manual-ban subset invariant holds. Returns false if it wasn't
    /// registered.
    pub fn remove_chat(&mut self, chat_id: i64) -> bool {
        let Some(pos) = self.chats.iter().position(|&c| c == chat_id) else {
            return false;
        };
        self.chats.remove(pos);
        self.delete_statuses.remove(&chat_id.to_string());
        self.manual_ban_allowed.retain(|&c| c != chat_id);
        true
    }

    pub fn status_delete_enabled(&self, chat_id: i64) -> bool {
        self.delete_statuses
            .get(&chat_id.to_string())
            .copied()
            .unwrap_or(false)
    }

    pub fn set_status_delete(&mut self, chat_id: i64, enabled: bool) {
        self.delete_statuses.insert(chat_id.to_string(), enabled);
    }

    pub fn manual_ban_enabled(&self, chat_id: i64) -> bool {
        self.manual_ban_allowed.contains(&chat_id)
    }

    /// Enable the manual ban vote for a registered chat. Idempotent; the
    /// caller guarantees the chat is in `chats`.
    pub fn allow_manual_ban(&mut self, chat_id: i64) {
        if !self.manual_ban_allowed.contains(&chat_id) {
            self.manual_ban_allowed.push(chat_id);
        }
    }

    /// Returns false if manual ban was already disabled.
    pub fn revoke_manual_ban(&mut self, chat_id: i64) -> bool {
        let before = self.manual_ban_allowed.len();
        self.manual_ban_allowed.retain(|&c| c != chat_id);
        self.manual_ban_allowed.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_unregister_restores_empty_mapping() {
        let mut record = ModeratorRecord::new(42);
        record.add_chat(-100123);

        assert_eq!(record.chats, vec![-100123]);
        assert_eq!(record.status_delete_enabled(-100123), false);
        assert_eq!(record.delete_statuses.len(), 1);

        assert!(record.remove_chat(-100123));
        assert!(record.chats.is_empty());
        assert!(record.delete_statuses.is_empty());
    }

    #[test]
    fn remove_chat_strips_manual_ban_permission() {
        let mut record = ModeratorRecord::new(42);
        record.add_chat(-100123);
        record.allow_manual_ban(-100123);
        assert!(record.manual_ban_enabled(-100123));

        record.remove_chat(-100123);
        assert!(!record.manual_ban_enabled(-100123));
        assert!(record.manual_ban_allowed.is_empty());
    }

    #[test]
    fn legacy_record_without_optional_fields_deserializes() {
        // Records written before the settings existed carry only the two
        // original fields; the rest must default, not fail.
        let legacy = r#"{"user_id": 7, "chats": [-100555]}"#;
        let record: ModeratorRecord = serde_json::from_str(legacy).unwrap();
        assert_eq!(record.user_id, 7);
        assert!(record.watches(-100555));
        assert!(record.delete_statuses.is_empty());
        assert!(record.manual_ban_allowed.is_empty());
    }

    #[test]
    fn persisted_shape_matches_reference_format() {
        let mut record = ModeratorRecord::new(9);
        record.add_chat(-100777);
        record.allow_manual_ban(-100777);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user_id"], 9);
        assert_eq!(json["chats"][0], -100777);
        assert_eq!(json["delete_statuses"]["-100777"], false);
        assert_eq!(json["manual_ban_allowed"][0], -100777);
    }
}
