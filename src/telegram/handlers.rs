// Event handlers for non-command updates: the automatic spam check, status
// message cleanup and ballot callbacks.
//
// Errors never escape to the dispatcher as fatal - every handler logs and
// moves on so one bad update cannot stall the ingestion loop.

use crate::core::classifier::MessageProfile;
use crate::core::enforcement::FlaggedMessage;
use crate::core::voting::{SessionKey, VoteOutcome};
use crate::telegram::formatter;
use crate::telegram::AppContext;
use anyhow::Result;
use std::sync::Arc;
use teloxide::payloads::EditMessageReplyMarkupSetters;
use teloxide::prelude::*;
use teloxide::types::MessageKind;

/// Entry point for every non-command message.
pub async fn handle_message(bot: Bot, ctx: Arc<AppContext>, msg: Message) -> Result<()> {
    if msg.chat.is_private() {
        return Ok(());
    }
    if is_status_update(&msg) {
        return handle_status(&bot, &ctx, &msg).await;
    }
    check_automatically(&ctx, &msg).await
}

/// Run the classifier over a group message and enforce a positive verdict.
async fn check_automatically(ctx: &AppContext, msg: &Message) -> Result<()> {
    let Some(from) = msg.from.clone() else {
        return Ok(());
    };
    if from.is_bot {
        return Ok(());
    }

    let text = msg
        .text()
        .or_else(|| msg.caption())
        .map(str::to_string);
    let profile = MessageProfile {
        text,
        is_reply: msg.reply_to_message().is_some(),
        from_premium: from.is_premium,
    };

    let verdict = ctx.classifier.classify(&profile);
    if !verdict.is_spam {
        return Ok(());
    }

    let flagged = FlaggedMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        author_id: from.id.0,
        author_display_name: formatter::display_name(&from),
        author_username: from.username.clone(),
        // classify() only returns spam when the profile carried text
        content: profile.text.unwrap_or_default(),
        is_media: msg.text().is_none(),
    };

    let outcome = ctx.enforcement.enforce(&flagged, &verdict.evidence).await;
    tracing::info!(
        chat_id = flagged.chat_id,
        author_id = flagged.author_id,
        deleted = outcome.deleted,
        banned = outcome.banned,
        owners_notified = outcome.owners_notified,
        "Automatic enforcement finished"
    );

    Ok(())
}

/// Delete service messages (joins, leaves, pins...) in chats where a
/// watcher enabled status cleanup. One deletion is enough; stop at the
/// first success.
async fn handle_status(bot: &Bot, ctx: &AppContext, msg: &Message) -> Result<()> {
    if status_from_bot(msg) {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;
    let watchers = ctx.registry.watchers_of(chat_id).await?;

    for watcher in watchers {
        if !watcher.status_delete_enabled(chat_id) {
            continue;
        }
        match bot.delete_message(msg.chat.id, msg.id).await {
            Ok(_) => break,
            Err(err) => {
                tracing::warn!(chat_id, "Failed to delete status message: {}", err);
            }
        }
    }

    Ok(())
}

/// Ballot button presses.
pub async fn handle_callback(bot: Bot, ctx: Arc<AppContext>, q: CallbackQuery) -> Result<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some((choice, target_user_id, target_message_id)) = formatter::parse_ballot_data(data)
    else {
        return Ok(());
    };
    let Some(ballot) = q.message.as_ref() else {
        return Ok(());
    };

    let chat_id = ballot.chat().id;
    let ballot_id = ballot.id();
    let key = SessionKey {
        chat_id: chat_id.0,
        ballot_message_id: ballot_id.0,
    };

    match ctx.votes.cast(key, q.from.id.0, choice) {
        VoteOutcome::Duplicate => {}
        VoteOutcome::SessionNotFound => {
            bot.edit_message_text(chat_id, ballot_id, "Голосование завершено или недействительно.")
                .await?;
        }
        VoteOutcome::Recorded(tally) => {
            let keyboard = formatter::ballot_keyboard(target_user_id, target_message_id, tally);
            bot.edit_message_reply_markup(chat_id, ballot_id)
                .reply_markup(keyboard)
                .await?;
        }
        VoteOutcome::Resolved {
            resolution,
            session,
        } => {
            tracing::info!(
                chat_id = chat_id.0,
                target_user_id = session.target_user_id,
                ?resolution,
                opened_at = %session.opened_at,
                "Ban vote resolved"
            );
            ctx.enforcement
                .resolve_vote(chat_id.0, ballot_id.0, resolution, &session)
                .await;
        }
    }

    Ok(())
}

fn is_status_update(msg: &Message) -> bool {
    !matches!(msg.kind, MessageKind::Common(_))
}

/// Service messages announcing another bot's actions are left alone.
fn status_from_bot(msg: &Message) -> bool {
    msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_message(from_bot: bool) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": -100123, "type": "supergroup", "title": "Чат"},
            "from": {"id": 7, "is_bot": from_bot, "first_name": "Сервис"},
            "new_chat_members": [{"id": 8, "is_bot": false, "first_name": "Новичок"}]
        }))
        .unwrap()
    }

    #[test]
    fn service_messages_are_status_updates() {
        let msg = service_message(false);
        assert!(is_status_update(&msg));
        assert!(!status_from_bot(&msg));
    }

    #[test]
    fn bot_authored_status_updates_are_skipped() {
        assert!(status_from_bot(&service_message(true)));
    }

    #[test]
    fn plain_text_is_not_a_status_update() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 2,
            "date": 1700000000,
            "chat": {"id": -100123, "type": "supergroup", "title": "Чат"},
            "from": {"id": 9, "is_bot": false, "first_name": "Автор"},
            "text": "привет"
        }))
        .unwrap();
        assert!(!is_status_update(&msg));
    }
}
