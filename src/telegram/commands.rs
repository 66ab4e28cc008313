// Command surface - thin adapters from bot commands to the core services.
//
// The registration family only works in a private chat with the bot and
// verifies admin rights against the target chat before touching the
// registry. /ban is the one group-side command; it opens a vote session.

use crate::core::enforcement::TransportClient;
use crate::core::voting::{SessionKey, VoteSession};
use crate::telegram::formatter;
use crate::telegram::AppContext;
use anyhow::Result;
use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use teloxide::utils::command::BotCommands;

const START_TEXT: &str = "Здравствуйте! Я бот, удаляющий спам.\n\n\
Чтобы начать работу, добавьте меня в чат как администратора с правами на удаление сообщений. \
Затем используйте команду /register <chat_id> чтобы зарегистрировать чат и начать получать логи \
удаленных сообщений. Используйте /unregister <chat_id> чтобы отменить регистрацию чата.\n\n\
Идентификатор чата выглядит примерно так: -100234567890.\n\n\
Полный список возможностей: /help.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    #[command(description = "Начать работу")]
    Start,
    #[command(description = "Показать справку")]
    Help,
    #[command(description = "Зарегистрировать чат")]
    Register(String),
    #[command(description = "Отменить регистрацию чата")]
    Unregister(String),
    #[command(description = "Показать ваши зарегистрированные чаты")]
    List,
    #[command(description = "Разрешить использование команды /ban в чате")]
    AllowManual(String),
    #[command(description = "Запретить использование команды /ban в чате")]
    CancelManual(String),
    #[command(description = "Включить автоматическое удаление статусов")]
    DeleteStatuses(String),
    #[command(description = "Отключить автоматическое удаление статусов")]
    AllowStatuses(String),
    #[command(description = "Запустить голосование за удаление сообщения и бан")]
    Ban,
}

pub async fn handle_command(
    bot: Bot,
    ctx: Arc<AppContext>,
    msg: Message,
    cmd: Command,
) -> Result<()> {
    let Some(from) = msg.from.clone() else {
        return Ok(());
    };
    let user_id = from.id.0;

    match cmd {
        // /ban is the one group-side command; everything below it is
        // registration management and only answers in a private chat.
        Command::Ban => return ban_command(&bot, &ctx, &msg, user_id).await,
        _ if !msg.chat.is_private() => {
            bot.send_message(msg.chat.id, "Эта команда доступна только в личном чате с ботом.")
                .await?;
        }
        Command::Start => {
            bot.send_message(msg.chat.id, START_TEXT).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Register(arg) => {
            let Some(chat_id) = parse_chat_arg(&bot, &msg, &arg).await? else {
                return Ok(());
            };
            if !verify_admin(&bot, &ctx, &msg, chat_id, user_id).await? {
                return Ok(());
            }
            ctx.registry.register_chat(user_id, chat_id).await?;
            bot.send_message(msg.chat.id, format!("Зарегистрирован чат {}", chat_id))
                .await?;
        }
        Command::Unregister(arg) => {
            let Some(chat_id) = parse_chat_arg(&bot, &msg, &arg).await? else {
                return Ok(());
            };
            match ctx.registry.unregister_chat(user_id, chat_id).await {
                Ok(()) => {
                    bot.send_message(
                        msg.chat.id,
                        format!("Отменена регистрация чата {}.", chat_id),
                    )
                    .await?;
                }
                Err(_) => {
                    bot.send_message(msg.chat.id, "Чат не зарегистрирован.").await?;
                }
            }
        }
        Command::List => {
            list_chats(&bot, &ctx, &msg, user_id).await?;
        }
        Command::AllowManual(arg) => {
            let Some(chat_id) = registered_chat_arg(&bot, &ctx, &msg, user_id, &arg).await? else {
                return Ok(());
            };
            if !verify_admin(&bot, &ctx, &msg, chat_id, user_id).await? {
                return Ok(());
            }
            ctx.registry.allow_manual_ban(user_id, chat_id).await?;
            bot.send_message(msg.chat.id, format!("Ручной бан разрешен для чата {}", chat_id))
                .await?;
        }
        Command::CancelManual(arg) => {
            let Some(chat_id) = registered_chat_arg(&bot, &ctx, &msg, user_id, &arg).await? else {
                return Ok(());
            };
            if !verify_admin(&bot, &ctx, &msg, chat_id, user_id).await? {
                return Ok(());
            }
            let changed = ctx.registry.revoke_manual_ban(user_id, chat_id).await?;
            let reply = if changed {
                format!("Ручной бан запрещен для чата {}", chat_id)
            } else {
                format!("Ручной бан уже был запрещен для чата {}", chat_id)
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
        Command::DeleteStatuses(arg) => {
            let Some(chat_id) = registered_chat_arg(&bot, &ctx, &msg, user_id, &arg).await? else {
                return Ok(());
            };
            if !verify_admin(&bot, &ctx, &msg, chat_id, user_id).await? {
                return Ok(());
            }
            ctx.registry.set_status_delete(user_id, chat_id, true).await?;
            bot.send_message(
                msg.chat.id,
                format!("Автоматическое удаление статусов включено для чата {}", chat_id),
            )
            .await?;
        }
        Command::AllowStatuses(arg) => {
            let Some(chat_id) = registered_chat_arg(&bot, &ctx, &msg, user_id, &arg).await? else {
                return Ok(());
            };
            if !verify_admin(&bot, &ctx, &msg, chat_id, user_id).await? {
                return Ok(());
            }
            ctx.registry.set_status_delete(user_id, chat_id, false).await?;
            bot.send_message(
                msg.chat.id,
                format!("Автоматическое удаление статусов отключено для чата {}", chat_id),
            )
            .await?;
        }
    }

    Ok(())
}

/// Open a ban vote on the replied-to message.
async fn ban_command(bot: &Bot, ctx: &AppContext, msg: &Message, user_id: u64) -> Result<()> {
    let chat_id = msg.chat.id.0;

    if !ctx.registry.manual_ban_enabled(user_id, chat_id).await? {
        bot.send_message(msg.chat.id, "Ручной бан не разрешен для этого чата.")
            .await?;
        return Ok(());
    }

    let Some(target) = msg.reply_to_message() else {
        bot.send_message(
            msg.chat.id,
            "Эта команда должна быть использована в ответ на сообщение.",
        )
        .await?;
        return Ok(());
    };
    let Some(target_user) = target.from.clone() else {
        return Ok(());
    };
    let target_message_id = target.id.0;

    // One open vote per target message.
    if ctx.votes.targets_message(chat_id, target_message_id) {
        return Ok(());
    }

    let session = VoteSession::new(user_id, target_user.id.0, target_message_id, msg.id.0);
    let keyboard =
        formatter::ballot_keyboard(target_user.id.0, target_message_id, session.tally());

    let ballot = bot
        .send_message(
            msg.chat.id,
            format!(
                "Удалить сообщение и забанить {}?",
                formatter::display_name(&target_user)
            ),
        )
        .reply_markup(keyboard)
        .reply_parameters(ReplyParameters {
            message_id: msg.id,
            chat_id: None,
            allow_sending_without_reply: Some(true),
            quote: None,
            quote_parse_mode: None,
            quote_entities: None,
            quote_position: None,
        })
        .await?;

    let key = SessionKey {
        chat_id,
        ballot_message_id: ballot.id.0,
    };
    if let Err(err) = ctx.votes.open(key, session) {
        // Lost a race with another /ban on the same target; drop our ballot.
        tracing::warn!(chat_id, target_message_id, "Vote already open: {}", err);
        let _ = bot.delete_message(msg.chat.id, ballot.id).await;
    }

    Ok(())
}

async fn list_chats(bot: &Bot, ctx: &AppContext, msg: &Message, user_id: u64) -> Result<()> {
    let record = ctx.registry.record_of(user_id).await?;
    let Some(record) = record.filter(|r| !r.chats.is_empty()) else {
        bot.send_message(msg.chat.id, "У вас нет зарегистрированных чатов.")
            .await?;
        return Ok(());
    };

    let mut listing = String::from("Ваши зарегистрированные чаты:\n\n");
    for &chat_id in &record.chats {
        match ctx.transport.chat_title(chat_id).await {
            Ok(title) => {
                let title = title.unwrap_or_else(|| "Unknown".to_string());
                let manual = if record.manual_ban_enabled(chat_id) {
                    "Включено"
                } else {
                    "Отключено"
                };
                let statuses = if record.status_delete_enabled(chat_id) {
                    "Включено"
                } else {
                    "Отключено"
                };
                listing.push_str(&format!(
                    "Название: {}\nИдентификатор: {}\nРучной бан: {}\nУдаление статусов: {}\n\n",
                    title, chat_id, manual, statuses
                ));
            }
            Err(_) => {
                listing.push_str(&format!(
                    "Недоступно: {} (Бот не имеет доступа к чату)\n",
                    chat_id
                ));
            }
        }
    }
    bot.send_message(msg.chat.id, listing).await?;

    Ok(())
}

/// Parse the `<chat_id>` argument, replying with the usage errors the
/// original bot used.
async fn parse_chat_arg(bot: &Bot, msg: &Message, arg: &str) -> Result<Option<i64>> {
    let arg = arg.trim();
    if arg.is_empty() {
        bot.send_message(msg.chat.id, "Добавьте идентификатор чата после команды.")
            .await?;
        return Ok(None);
    }
    match arg.parse::<i64>() {
        Ok(chat_id) => Ok(Some(chat_id)),
        Err(_) => {
            bot.send_message(
                msg.chat.id,
                "Неверный формат идентификатора чата. Используйте числовой ID.",
            )
            .await?;
            Ok(None)
        }
    }
}

/// Like parse_chat_arg, but the chat must already be registered by this
/// moderator.
async fn registered_chat_arg(
    bot: &Bot,
    ctx: &AppContext,
    msg: &Message,
    user_id: u64,
    arg: &str,
) -> Result<Option<i64>> {
    let Some(chat_id) = parse_chat_arg(bot, msg, arg).await? else {
        return Ok(None);
    };
    let registered = ctx
        .registry
        .record_of(user_id)
        .await?
        .map(|r| r.watches(chat_id))
        .unwrap_or(false);
    if !registered {
        bot.send_message(msg.chat.id, "Чат не зарегистрирован.").await?;
        return Ok(None);
    }
    Ok(Some(chat_id))
}

/// Verify the caller administers the target chat, replying on failure.
async fn verify_admin(
    bot: &Bot,
    ctx: &AppContext,
    msg: &Message,
    chat_id: i64,
    user_id: u64,
) -> Result<bool> {
    match ctx.transport.member_status(chat_id, user_id).await {
        Ok(status) if status.is_admin() => Ok(true),
        Ok(_) => {
            bot.send_message(msg.chat.id, "Вы не администратор этого чата.")
                .await?;
            Ok(false)
        }
        Err(err) => {
            tracing::warn!(chat_id, user_id, "Admin check failed: {}", err);
            bot.send_message(
                msg.chat.id,
                "Не удалось проверить права администратора. Убедитесь, что бот добавлен в чат.",
            )
            .await?;
            Ok(false)
        }
    }
}
