// Telegram implementation of the core TransportClient port.
//
// Bot API calls carry no timeout of their own, so every request is bounded
// here; expiry surfaces as a TransportError and flows down the same
// failure-report path as any other platform error.

use crate::core::enforcement::{MemberStatus, TransportClient, TransportError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use teloxide::payloads::{CopyMessageSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::{ChatMemberStatus, LinkPreviewOptions, MessageId, ParseMode};

pub struct TelegramTransport {
    bot: Bot,
    timeout: Duration,
}

impl TelegramTransport {
    pub fn new(bot: Bot, timeout: Duration) -> Self {
        Self { bot, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, teloxide::RequestError>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TransportError::Api(err.to_string())),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }

    fn no_preview() -> LinkPreviewOptions {
        LinkPreviewOptions {
            is_disabled: true,
            url: None,
            prefer_small_media: false,
            prefer_large_media: false,
            show_above_text: false,
        }
    }
}

#[async_trait]
impl TransportClient for TelegramTransport {
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TransportError> {
        self.bounded(
            self.bot
                .delete_message(ChatId(chat_id), MessageId(message_id))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn ban_member(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError> {
        self.bounded(
            self.bot
                .ban_chat_member(ChatId(chat_id), UserId(user_id))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn send_notice(&self, user_id: u64, html: &str) -> Result<(), TransportError> {
        self.bounded(
            self.bot
                .send_message(ChatId(user_id as i64), html)
                .parse_mode(ParseMode::Html)
                .link_preview_options(Self::no_preview())
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn copy_message(
        &self,
        to_user: u64,
        from_chat: i64,
        message_id: i32,
        caption_html: &str,
    ) -> Result<(), TransportError> {
        self.bounded(
            self.bot
                .copy_message(
                    ChatId(to_user as i64),
                    ChatId(from_chat),
                    MessageId(message_id),
                )
                .caption(caption_html)
                .parse_mode(ParseMode::Html)
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn chat_title(&self, chat_id: i64) -> Result<Option<String>, TransportError> {
        let chat = self.bounded(self.bot.get_chat(ChatId(chat_id)).send()).await?;
        Ok(chat.title().map(str::to_string))
    }

    async fn member_status(
        &self,
        chat_id: i64,
        user_id: u64,
    ) -> Result<MemberStatus, TransportError> {
        let member = self
            .bounded(
                self.bot
                    .get_chat_member(ChatId(chat_id), UserId(user_id))
                    .send(),
            )
            .await?;
        Ok(match member.status() {
            ChatMemberStatus::Owner => MemberStatus::Owner,
            ChatMemberStatus::Administrator => MemberStatus::Administrator,
            ChatMemberStatus::Member => MemberStatus::Member,
            ChatMemberStatus::Restricted => MemberStatus::Restricted,
            ChatMemberStatus::Left => MemberStatus::Left,
            ChatMemberStatus::Banned => MemberStatus::Banned,
        })
    }
}
