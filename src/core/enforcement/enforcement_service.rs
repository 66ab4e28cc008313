// Moderation action engine - executes verdicts and vote resolutions.
//
// Everything here is failure-tolerant by design: platform errors are caught,
// logged and converted into failure reports for the chat's owners. Nothing
// in this module may take down the ingestion loop - one bad message or one
// unreachable owner stays local to that message.

use super::enforcement_models::{ActionOutcome, FlaggedMessage};
use super::report;
use super::transport::TransportClient;
use crate::core::classifier::EvidenceReport;
use crate::core::registry::{RegistryService, RegistryStore};
use crate::core::voting::{Resolution, VoteSession};
use std::sync::Arc;

pub struct EnforcementService<T: TransportClient, S: RegistryStore> {
    transport: Arc<T>,
    registry: Arc<RegistryService<S>>,
}

impl<T: TransportClient, S: RegistryStore> EnforcementService<T, S> {
    pub fn new(transport: Arc<T>, registry: Arc<RegistryService<S>>) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// Execute a positive spam verdict: delete the message, ban the author,
    /// report to every registered owner of the chat.
    ///
    /// Delete and ban are both attempted even if one fails, in that order
    /// (a ban must not race a delete on the same content). A failure turns
    /// the success report into a failure report; owner delivery is
    /// independent per owner, so one unreachable moderator never blocks the
    /// rest.
    pub async fn enforce(
        &self,
        msg: &FlaggedMessage,
        evidence: &EvidenceReport,
    ) -> ActionOutcome {
        let owners = match self.registry.watchers_of(msg.chat_id).await {
            Ok(owners) => owners,
            Err(err) => {
                tracing::error!(chat_id = msg.chat_id, "Registry lookup failed: {}", err);
                return ActionOutcome::skipped();
            }
        };
        if owners.is_empty() {
            return ActionOutcome::skipped();
        }

        let chat_title = self.chat_title_or_fallback(msg.chat_id).await;

        let mut failure = None;
        let deleted = match self.transport.delete_message(msg.chat_id, msg.message_id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    chat_id = msg.chat_id,
                    message_id = msg.message_id,
                    "Failed to delete spam message: {}",
                    err
                );
                failure = Some(err.to_string());
                false
            }
        };

        let banned = match self.transport.ban_member(msg.chat_id, msg.author_id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    chat_id = msg.chat_id,
                    user_id = msg.author_id,
                    "Failed to ban spam author: {}",
                    err
                );
                if failure.is_none() {
                    failure = Some(err.to_string());
                }
                false
            }
        };

        let rendered = match &failure {
            None => report::success_report(msg, &chat_title, evidence),
            Some(cause) => report::failure_report(msg, &chat_title, evidence, cause),
        };

        let mut notified = 0;
        let mut unreachable = 0;
        for owner in &owners {
            // When a media message survived the delete, forward the original
            // itself as evidence; otherwise the captured content is embedded
            // in the report.
            let delivery = if msg.is_media && !deleted {
                self.transport
                    .copy_message(owner.user_id, msg.chat_id, msg.message_id, &rendered)
                    .await
            } else {
                self.transport.send_notice(owner.user_id, &rendered).await
            };
            match delivery {
                Ok(()) => notified += 1,
                Err(err) => {
                    unreachable += 1;
                    tracing::warn!(
                        owner_id = owner.user_id,
                        chat_id = msg.chat_id,
                        "Failed to notify owner: {}",
                        err
                    );
                }
            }
        }

        ActionOutcome {
            deleted,
            banned,
            failure,
            owners_notified: notified,
            owners_unreachable: unreachable,
        }
    }

    /// Execute a resolved ban vote.
    ///
    /// Confirmed: delete the target message and ban the target user, then
    /// clean up the ballot and the originating command message. Cancelled:
    /// clean up only. Every step is attempted regardless of earlier
    /// failures.
    pub async fn resolve_vote(
        &self,
        chat_id: i64,
        ballot_message_id: i32,
        resolution: Resolution,
        session: &VoteSession,
    ) {
        if resolution == Resolution::Confirmed {
            if let Err(err) = self
                .transport
                .delete_message(chat_id, session.target_message_id)
                .await
            {
                tracing::warn!(
                    chat_id,
                    message_id = session.target_message_id,
                    "Failed to delete vote target: {}",
                    err
                );
            }
            if let Err(err) = self
                .transport
                .ban_member(chat_id, session.target_user_id)
                .await
            {
                tracing::warn!(
                    chat_id,
                    user_id = session.target_user_id,
                    "Failed to ban vote target: {}",
                    err
                );
            }
        }

        for message_id in [ballot_message_id, session.command_message_id] {
            if let Err(err) = self.transport.delete_message(chat_id, message_id).await {
                tracing::warn!(
                    chat_id,
                    message_id,
                    "Failed to clean up vote message: {}",
                    err
                );
            }
        }
    }

    async fn chat_title_or_fallback(&self, chat_id: i64) -> String {
        match self.transport.chat_title(chat_id).await {
            Ok(Some(title)) => title,
            Ok(None) => format!("Chat {}", chat_id),
            Err(err) => {
                tracing::warn!(chat_id, "Failed to fetch chat title: {}", err);
                format!("Chat {}", chat_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enforcement::transport::{MemberStatus, TransportError};
    use crate::core::voting::VoteSession;
    use crate::infra::registry::InMemoryRegistryStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const CHAT: i64 = -100123;

    /// Transport double that records every call and fails the operations it
    /// was told to fail.
    struct MockTransport {
        calls: Mutex<Vec<String>>,
        failing: HashSet<&'static str>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: HashSet::new(),
            }
        }

        fn failing(ops: &[&'static str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: ops.iter().copied().collect(),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, op: &str) -> Result<(), TransportError> {
            if self.failing.contains(op) {
                Err(TransportError::Api(format!("{} rejected", op)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TransportClient for MockTransport {
        async fn delete_message(
            &self,
            chat_id: i64,
            message_id: i32,
        ) -> Result<(), TransportError> {
            self.record(format!("delete:{}:{}", chat_id, message_id));
            self.check("delete")
        }

        async fn ban_member(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError> {
            self.record(format!("ban:{}:{}", chat_id, user_id));
            self.check("ban")
        }

        async fn send_notice(&self, user_id: u64, _html: &str) -> Result<(), TransportError> {
            self.record(format!("notice:{}", user_id));
            if self.failing.contains("notice_first") && user_id == 1 {
                return Err(TransportError::Api("owner unreachable".to_string()));
            }
            self.check("notice")
        }

        async fn copy_message(
            &self,
            to_user: u64,
            from_chat: i64,
            message_id: i32,
            _caption_html: &str,
        ) -> Result<(), TransportError> {
            self.record(format!("copy:{}:{}:{}", to_user, from_chat, message_id));
            self.check("copy")
        }

        async fn chat_title(&self, _chat_id: i64) -> Result<Option<String>, TransportError> {
            Ok(Some("Тестовый чат".to_string()))
        }

        async fn member_status(
            &self,
            _chat_id: i64,
            _user_id: u64,
        ) -> Result<MemberStatus, TransportError> {
            Ok(MemberStatus::Member)
        }
    }

    async fn registry_with_owners(
        owners: &[u64],
    ) -> Arc<RegistryService<InMemoryRegistryStore>> {
        let registry = Arc::new(RegistryService::new(InMemoryRegistryStore::new()));
        for &owner in owners {
            registry.register_chat(owner, CHAT).await.unwrap();
        }
        registry
    }

    fn flagged() -> FlaggedMessage {
        FlaggedMessage {
            chat_id: CHAT,
            message_id: 10,
            author_id: 99,
            author_display_name: "Spammer".to_string(),
            author_username: None,
            content: "✅✅✅✅ call now".to_string(),
            is_media: false,
        }
    }

    #[tokio::test]
    async fn enforce_deletes_bans_and_notifies_all_owners() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with_owners(&[1, 2]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let outcome = service.enforce(&flagged(), &EvidenceReport::default()).await;

        assert!(outcome.fully_enforced());
        assert_eq!(outcome.owners_notified, 2);
        assert_eq!(outcome.owners_unreachable, 0);

        let calls = transport.calls();
        // Delete strictly before ban
        assert_eq!(calls[0], format!("delete:{}:10", CHAT));
        assert_eq!(calls[1], format!("ban:{}:99", CHAT));
        assert!(calls.contains(&"notice:1".to_string()));
        assert!(calls.contains(&"notice:2".to_string()));
    }

    #[tokio::test]
    async fn enforce_skips_unwatched_chats() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with_owners(&[]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let outcome = service.enforce(&flagged(), &EvidenceReport::default()).await;

        assert_eq!(outcome, ActionOutcome::skipped());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn ban_failure_still_notifies_with_failure_report() {
        let transport = Arc::new(MockTransport::failing(&["ban"]));
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let outcome = service.enforce(&flagged(), &EvidenceReport::default()).await;

        assert!(outcome.deleted);
        assert!(!outcome.banned);
        assert!(outcome.failure.is_some());
        assert_eq!(outcome.owners_notified, 1);

        let calls = transport.calls();
        assert!(calls.iter().any(|c| c.starts_with("delete:")));
        assert!(calls.iter().any(|c| c.starts_with("ban:")));
        assert!(calls.iter().any(|c| c.starts_with("notice:")));
    }

    #[tokio::test]
    async fn delete_failure_does_not_skip_the_ban() {
        let transport = Arc::new(MockTransport::failing(&["delete"]));
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let outcome = service.enforce(&flagged(), &EvidenceReport::default()).await;

        assert!(!outcome.deleted);
        assert!(outcome.banned);
        assert!(outcome.failure.is_some());
        assert!(transport.calls().iter().any(|c| c.starts_with("ban:")));
    }

    #[tokio::test]
    async fn one_unreachable_owner_does_not_block_the_rest() {
        let transport = Arc::new(MockTransport::failing(&["notice_first"]));
        let registry = registry_with_owners(&[1, 2]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let outcome = service.enforce(&flagged(), &EvidenceReport::default()).await;

        assert_eq!(outcome.owners_notified, 1);
        assert_eq!(outcome.owners_unreachable, 1);
        assert!(transport.calls().contains(&"notice:2".to_string()));
    }

    #[tokio::test]
    async fn surviving_media_message_is_forwarded_as_copy() {
        let transport = Arc::new(MockTransport::failing(&["delete"]));
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let mut msg = flagged();
        msg.is_media = true;
        let outcome = service.enforce(&msg, &EvidenceReport::default()).await;

        assert_eq!(outcome.owners_notified, 1);
        assert!(transport
            .calls()
            .contains(&format!("copy:1:{}:10", CHAT)));
    }

    #[tokio::test]
    async fn confirmed_vote_enforces_and_cleans_up() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let session = VoteSession::new(1, 99, 400, 450);
        service
            .resolve_vote(CHAT, 500, Resolution::Confirmed, &session)
            .await;

        let calls = transport.calls();
        assert_eq!(
            calls,
            vec![
                format!("delete:{}:400", CHAT),
                format!("ban:{}:99", CHAT),
                format!("delete:{}:500", CHAT),
                format!("delete:{}:450", CHAT),
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_vote_only_cleans_up() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let session = VoteSession::new(1, 99, 400, 450);
        service
            .resolve_vote(CHAT, 500, Resolution::Cancelled, &session)
            .await;

        let calls = transport.calls();
        assert_eq!(
            calls,
            vec![
                format!("delete:{}:500", CHAT),
                format!("delete:{}:450", CHAT),
            ]
        );
    }

    #[tokio::test]
    async fn vote_enforcement_failure_never_blocks_cleanup() {
        let transport = Arc::new(MockTransport::failing(&["ban"]));
        let registry = registry_with_owners(&[1]).await;
        let service = EnforcementService::new(Arc::clone(&transport), registry);

        let session = VoteSession::new(1, 99, 400, 450);
        service
            .resolve_vote(CHAT, 500, Resolution::Confirmed, &session)
            .await;

        // Ballot and command message cleanup still ran after the failed ban
        let calls = transport.calls();
        assert!(calls.contains(&format!("delete:{}:500", CHAT)));
        assert!(calls.contains(&format!("delete:{}:450", CHAT)));
    }
}
