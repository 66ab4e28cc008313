// Transport port - the messaging platform as the core sees it.
//
// Every operation is a network round trip that can fail with a
// human-readable cause. Implementations must bound each call with a timeout
// and surface expiry as a TransportError like any other platform failure;
// the core converts all of them into notifications instead of propagating.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Api(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// A chat member's standing, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    pub fn is_admin(self) -> bool {
        matches!(self, MemberStatus::Owner | MemberStatus::Administrator)
    }
}

#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TransportError>;

    async fn ban_member(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError>;

    /// Deliver an HTML-formatted notice to a moderator's private chat.
    async fn send_notice(&self, user_id: u64, html: &str) -> Result<(), TransportError>;

    /// Copy an existing message to a moderator, attaching the report as the
    /// caption. Used when the original still exists and can serve as its own
    /// evidence.
    async fn copy_message(
        &self,
        to_user: u64,
        from_chat: i64,
        message_id: i32,
        caption_html: &str,
    ) -> Result<(), TransportError>;

    /// Chat title, when the platform exposes one.
    async fn chat_title(&self, chat_id: i64) -> Result<Option<String>, TransportError>;

    async fn member_status(
        &self,
        chat_id: i64,
        user_id: u64,
    ) -> Result<MemberStatus, TransportError>;
}
